//! Monitoring API clients and their per-subscription cache.
//!
//! The wire protocol is up to the [`MonitorClient`] implementation; the core only
//! needs it to turn scrape definitions into measured values.

mod cache;
pub use cache::MonitorClientCache;

mod definitions;
pub use definitions::{InMemoryMetricDefinitionCache, MetricDefinitionCache};

use std::sync::Arc;

use async_trait::async_trait;
use scrape_model::{AzureMetadata, BatchScrapeDefinition, MeasuredValue, RuntimeConfig, ScrapeDefinition};

use crate::{
    error::ScrapeError,
    sink::{MetricSink, SystemMetricsPublisher},
};

/// Client of the remote monitoring API for one tenant and subscription.
#[async_trait]
pub trait MonitorClient: Send + Sync {
    fn tenant_id(&self) -> &str;

    fn subscription_id(&self) -> &str;

    /// Query every series of `def`'s metric on its resource.
    async fn query(&self, def: &ScrapeDefinition) -> Result<Vec<MeasuredValue>, ScrapeError>;

    /// Query all members of `batch`; one entry per member, in member order.
    ///
    /// Defaults to one `query` per member.
    async fn query_batch(&self, batch: &BatchScrapeDefinition) -> Result<Vec<Vec<MeasuredValue>>, ScrapeError> {
        let mut out = Vec::with_capacity(batch.len());
        for def in &batch.scrape_definitions {
            out.push(self.query(def).await?);
        }
        Ok(out)
    }
}

/// Everything needed to construct a client.
pub struct ClientContext<'a> {
    pub metadata: &'a AzureMetadata,
    pub tenant_id: &'a str,
    pub subscription_id: &'a str,
    pub sink: &'a Arc<dyn MetricSink>,
    pub publisher: &'a Arc<dyn SystemMetricsPublisher>,
    pub definition_cache: &'a Arc<dyn MetricDefinitionCache>,
    pub config: &'a RuntimeConfig,
}

/// Constructs a new client; called once per tenant and subscription by the cache.
pub trait ClientBuilder: Send + Sync {
    fn build(&self, ctx: &ClientContext<'_>) -> Result<Arc<dyn MonitorClient>, ScrapeError>;
}

/// Hands out the client for a tenant and subscription, creating it on first use.
pub trait MonitorClientFactory: Send + Sync {
    fn get_or_create(&self, ctx: &ClientContext<'_>) -> Result<Arc<dyn MonitorClient>, ScrapeError>;
}
