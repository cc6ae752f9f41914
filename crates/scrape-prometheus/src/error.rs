use scrape_core::ScrapeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("gauge {metric} expects labels [{expected}] but got [{got}]")]
    LabelMismatch {
        metric: String,
        expected: String,
        got: String,
    },
    #[error("failed to encode metrics: {0}")]
    Encode(String),
}

impl From<SinkError> for ScrapeError {
    fn from(e: SinkError) -> Self {
        ScrapeError::Sink(e.to_string())
    }
}
