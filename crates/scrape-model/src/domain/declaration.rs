use serde::{Deserialize, Serialize};

use crate::{AzureCloud, CloudEndpoints, CloudEnvironment, MetricAggregation, MetricDefinition, ModelError};

/// Default number of time series kept per metric when nothing else is configured.
const DEFAULT_LIMIT: u32 = 10;

/// Which metrics to collect, from which resources, in which cloud.
///
/// Loaded once and shared by every run of the jobs built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDeclaration {
    pub azure_metadata: AzureMetadata,
    #[serde(default)]
    pub metric_defaults: MetricDefaults,
    /// Declared metrics; `null` entries are tolerated and skipped at run time.
    #[serde(default)]
    pub metrics: Vec<Option<MetricDefinition>>,
}

/// Tenant, subscription and cloud every scrape falls back to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureMetadata {
    pub tenant_id: String,
    pub subscription_id: String,
    pub resource_group_name: String,
    #[serde(default)]
    pub cloud: AzureCloud,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<CloudEndpoints>,
}

/// Settings applied to metrics which do not configure them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricDefaults {
    pub scraping: Option<Scraping>,
    pub aggregation: Option<MetricAggregation>,
    pub limit: u32,
}

/// Scraping schedule of a metric.
///
/// Two metrics can share a job only when their `Scraping` values are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scraping {
    /// Cron expression, interpreted by the host scheduler.
    #[serde(default)]
    pub schedule: Option<String>,
}

impl Scraping {
    pub fn new(schedule: impl Into<String>) -> Self {
        Self {
            schedule: Some(schedule.into()),
        }
    }

    /// Schedule text for diagnostics; empty when unset.
    pub fn schedule_str(&self) -> &str {
        self.schedule.as_deref().unwrap_or_default()
    }
}

impl Default for MetricDefaults {
    fn default() -> Self {
        Self {
            scraping: None,
            aggregation: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl AzureMetadata {
    /// Endpoints of the configured cloud.
    pub fn environment(&self) -> Result<CloudEnvironment, ModelError> {
        self.cloud.environment(self.endpoints.as_ref())
    }

    /// Log Analytics query endpoint of the configured cloud, if it has one.
    pub fn log_analytics_endpoint(&self) -> Result<Option<String>, ModelError> {
        Ok(self.environment()?.log_analytics_endpoint)
    }
}

impl MetricsDeclaration {
    /// Metric definitions that are actually present.
    pub fn defined_metrics(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.metrics.iter().flatten()
    }

    /// Fill unset scraping, aggregation and limit values from [`MetricDefaults`].
    pub fn with_defaults_applied(mut self) -> Self {
        let defaults = self.metric_defaults.clone();
        for metric in self.metrics.iter_mut().flatten() {
            if metric.scraping.is_none() {
                metric.scraping = defaults.scraping.clone();
            }
            if let Some(azure) = metric.azure_metric_configuration.as_mut() {
                if azure.aggregation.is_none() {
                    azure.aggregation = defaults.aggregation.clone();
                }
                if azure.limit.is_none() {
                    azure.limit = Some(defaults.limit);
                }
            }
        }
        self
    }
}
