use async_trait::async_trait;
use scrape_model::MetricSample;

use crate::error::ScrapeError;

/// Destination of scraped samples.
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn write(&self, sample: &MetricSample) -> Result<(), ScrapeError>;
}

/// Destination of the agent's own health gauges.
#[async_trait]
pub trait SystemMetricsPublisher: Send + Sync {
    async fn write_gauge(
        &self,
        name: &str,
        description: &str,
        value: f64,
        labels: &[(&str, &str)],
    ) -> Result<(), ScrapeError>;
}
