use std::collections::BTreeSet;

use async_trait::async_trait;
use scrape_model::{
    API_TRAFFIC_TARGET, BatchScrapeDefinition, MeasuredValue, MetricSample, ResourceType, ScrapeDefinition,
};
use tracing::{debug, info, warn};

use super::{Scraper, ScraperContext};
use crate::{error::ScrapeError, router::ScraperProvider};

/// Scraper for resources exposed through the metrics API.
///
/// Every series returned by the client becomes one sample.
pub struct MonitorScraper {
    ctx: ScraperContext,
}

impl MonitorScraper {
    pub fn new(ctx: ScraperContext) -> Self {
        Self { ctx }
    }

    async fn report(&self, def: &ScrapeDefinition, series: &[MeasuredValue]) -> Result<(), ScrapeError> {
        info!(
            target: API_TRAFFIC_TARGET,
            metric = def.metric_name(),
            resource_uri = %def.resource_uri(),
            subscription = %def.subscription_id,
            series = series.len(),
            "queried monitoring api"
        );
        if series.is_empty() {
            warn!(
                metric = def.metric_name(),
                resource = def.resource.resource_name(),
                "no series returned for metric"
            );
        }
        for measured in series {
            let sample = MetricSample::from_measurement(def, measured);
            self.ctx.sink.write(&sample).await?;
        }
        self.publish_success(def, true).await;
        Ok(())
    }

    async fn publish_success(&self, def: &ScrapeDefinition, success: bool) {
        let resource_type = def.resource_type();
        let labels = [
            ("metric_name", def.metric_name()),
            ("resource_type", resource_type.as_str()),
            ("subscription_id", def.subscription_id.as_str()),
        ];
        let value = if success { 1.0 } else { 0.0 };
        if let Err(e) = self
            .ctx
            .publisher
            .write_gauge(
                "scrape_success",
                "Whether the last scrape of a metric succeeded",
                value,
                &labels,
            )
            .await
        {
            debug!(error = %e, "failed to publish scrape health");
        }
    }
}

#[async_trait]
impl Scraper for MonitorScraper {
    async fn scrape(&self, def: &ScrapeDefinition) -> Result<(), ScrapeError> {
        match self.ctx.client.query(def).await {
            Ok(series) => self.report(def, &series).await,
            Err(e) => {
                self.publish_success(def, false).await;
                Err(e)
            }
        }
    }

    async fn batch_scrape(&self, batch: &BatchScrapeDefinition) -> Result<(), ScrapeError> {
        let results = match self.ctx.client.query_batch(batch).await {
            Ok(results) => results,
            Err(e) => {
                for def in &batch.scrape_definitions {
                    self.publish_success(def, false).await;
                }
                return Err(e);
            }
        };
        if results.len() != batch.len() {
            return Err(ScrapeError::Remote(format!(
                "batch query returned {} results for {} resources",
                results.len(),
                batch.len()
            )));
        }

        for (def, series) in batch.scrape_definitions.iter().zip(&results) {
            self.report(def, series).await?;
        }
        Ok(())
    }
}

/// Provides [`MonitorScraper`] for a fixed set of resource types.
pub struct MonitorScraperProvider {
    types: BTreeSet<ResourceType>,
}

impl MonitorScraperProvider {
    pub fn new(types: impl IntoIterator<Item = ResourceType>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }

    /// Every resource type except Log Analytics workspaces.
    pub fn metrics_api() -> Self {
        Self::new([
            ResourceType::Generic,
            ResourceType::VirtualMachine,
            ResourceType::StorageAccount,
            ResourceType::ServiceBusNamespace,
            ResourceType::SqlDatabase,
            ResourceType::RedisCache,
        ])
    }
}

impl ScraperProvider for MonitorScraperProvider {
    fn name(&self) -> &'static str {
        "azure-monitor"
    }

    fn supports(&self, resource_type: ResourceType) -> bool {
        self.types.contains(&resource_type)
    }

    fn build(&self, ctx: ScraperContext) -> Result<Box<dyn Scraper>, ScrapeError> {
        Ok(Box::new(MonitorScraper::new(ctx)))
    }
}
