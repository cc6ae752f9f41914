mod monitor;
pub use monitor::{MonitorScraper, MonitorScraperProvider};

use std::sync::Arc;

use async_trait::async_trait;
use scrape_model::{BatchScrapeDefinition, ResourceType, ScrapeDefinition};

use crate::{
    client::MonitorClient,
    credential::Credential,
    error::ScrapeError,
    sink::{MetricSink, SystemMetricsPublisher},
};

/// Collects one metric for one resource (or one batch) and writes it to the sink.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(&self, def: &ScrapeDefinition) -> Result<(), ScrapeError>;

    async fn batch_scrape(&self, batch: &BatchScrapeDefinition) -> Result<(), ScrapeError>;
}

/// Picks and builds the scraper for a resource type.
pub trait ScraperFactory: Send + Sync {
    fn create_scraper(&self, resource_type: ResourceType, ctx: ScraperContext) -> Result<Box<dyn Scraper>, ScrapeError>;
}

/// Log Analytics endpoint and credential of the declaration's cloud.
#[derive(Debug, Clone)]
pub struct LogAnalyticsTarget {
    /// `None` for clouds without Log Analytics.
    pub endpoint: Option<String>,
    pub credential: Credential,
}

/// Dependencies handed to a freshly built scraper.
#[derive(Clone)]
pub struct ScraperContext {
    pub sink: Arc<dyn MetricSink>,
    pub publisher: Arc<dyn SystemMetricsPublisher>,
    pub client: Arc<dyn MonitorClient>,
    pub log_analytics: LogAnalyticsTarget,
}
