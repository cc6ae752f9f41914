use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("metric definition has no prometheus metric definition")]
    MissingPrometheusDefinition,
    #[error("metric {metric} has no azure metric configuration")]
    MissingAzureMetric { metric: String },
    #[error("custom cloud endpoint is not configured: {0}")]
    MissingEndpoint(&'static str),
    #[error("invalid metrics declaration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
