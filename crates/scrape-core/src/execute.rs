use std::sync::Arc;

use scrape_model::{BatchScrapeDefinition, MetricsDeclaration, ResourceType, RuntimeConfig, ScrapeDefinition};
use tracing::{debug, error, info};

use crate::{
    client::ClientContext,
    error::{CoreError, ScrapeError},
    job::Collaborators,
    scheduler::{ScheduledTasks, TaskScheduler},
    scraper::{LogAnalyticsTarget, Scraper, ScraperContext},
};

/// Runs scrapes for one job; every failure is logged and contained here.
pub(crate) struct ScrapeExecutor {
    job: Arc<str>,
    declaration: Arc<MetricsDeclaration>,
    collaborators: Collaborators,
    config: Arc<RuntimeConfig>,
}

impl ScrapeExecutor {
    pub(crate) fn new(
        job: Arc<str>,
        declaration: Arc<MetricsDeclaration>,
        collaborators: Collaborators,
        config: Arc<RuntimeConfig>,
    ) -> Self {
        Self {
            job,
            declaration,
            collaborators,
            config,
        }
    }

    /// Schedule one scrape per definition and wait for all of them.
    ///
    /// Units already admitted are awaited even when admission stops early, so none of
    /// them holds a slot once this returns.
    pub(crate) async fn scrape_each(
        self: &Arc<Self>,
        definitions: Vec<ScrapeDefinition>,
        scheduler: &TaskScheduler,
    ) -> Result<(), CoreError> {
        let mut tasks = ScheduledTasks::new();
        let admitted = self.admit_each(definitions, scheduler, &mut tasks).await;
        let settled = tasks.wait_all().await;
        admitted.and(settled)
    }

    async fn admit_each(
        self: &Arc<Self>,
        definitions: Vec<ScrapeDefinition>,
        scheduler: &TaskScheduler,
        tasks: &mut ScheduledTasks,
    ) -> Result<(), CoreError> {
        for def in definitions {
            scheduler.ensure_active()?;

            info!(
                job = %self.job,
                metric = def.metric_name(),
                resource_type = %def.resource_type(),
                "scraping metric"
            );
            let executor = self.clone();
            scheduler
                .schedule(tasks, async move { executor.scrape(def).await })
                .await?;
        }
        Ok(())
    }

    /// Schedule one batched scrape per batch and wait for all of them.
    pub(crate) async fn scrape_batches(
        self: &Arc<Self>,
        batches: Vec<BatchScrapeDefinition>,
        scheduler: &TaskScheduler,
    ) -> Result<(), CoreError> {
        let mut tasks = ScheduledTasks::new();
        let admitted = self.admit_batches(batches, scheduler, &mut tasks).await;
        let settled = tasks.wait_all().await;
        admitted.and(settled)
    }

    async fn admit_batches(
        self: &Arc<Self>,
        batches: Vec<BatchScrapeDefinition>,
        scheduler: &TaskScheduler,
        tasks: &mut ScheduledTasks,
    ) -> Result<(), CoreError> {
        for batch in batches {
            info!(
                job = %self.job,
                batch_size = batch.len(),
                azure_metric = batch.azure_metric_name(),
                resource_type = %batch.properties.resource_type,
                "executing batch scrape"
            );
            let executor = self.clone();
            scheduler
                .schedule(tasks, async move { executor.scrape_batch(batch).await })
                .await?;
        }
        Ok(())
    }

    async fn scrape(&self, def: ScrapeDefinition) {
        let outcome: Result<(), ScrapeError> = async {
            let scraper = self.scraper_for(def.resource_type(), &def.subscription_id)?;
            scraper.scrape(&def).await
        }
        .await;

        if let Err(e) = outcome {
            error!(
                job = %self.job,
                metric = def.metric_name(),
                resource = def.resource.resource_name(),
                error = %e,
                "failed to scrape metric for resource"
            );
        }
    }

    async fn scrape_batch(&self, batch: BatchScrapeDefinition) {
        let outcome: Result<(), ScrapeError> = async {
            let props = &batch.properties;
            let scraper = self.scraper_for(props.resource_type, &props.subscription_id)?;
            scraper.batch_scrape(&batch).await
        }
        .await;

        if let Err(e) = outcome {
            error!(
                job = %self.job,
                metric = batch.metric_name(),
                resource_type = %batch.properties.resource_type,
                batch_size = batch.len(),
                error = %e,
                "failed to scrape metric for resource batch"
            );
        }
    }

    /// Resolve client, credential and scraper for a resource type in a subscription.
    ///
    /// `subscription_id` is the effective one: resource override, else declaration default.
    fn scraper_for(&self, resource_type: ResourceType, subscription_id: &str) -> Result<Box<dyn Scraper>, ScrapeError> {
        let metadata = &self.declaration.azure_metadata;
        let c = &self.collaborators;
        debug!(
            use_azure_monitor_sdk = self.config.azure_monitor.integration.use_azure_monitor_sdk,
            "parsed sdk config"
        );

        let client = c.clients.get_or_create(&ClientContext {
            metadata,
            tenant_id: &metadata.tenant_id,
            subscription_id,
            sink: &c.sink,
            publisher: &c.publisher,
            definition_cache: &c.definition_cache,
            config: &self.config,
        })?;

        let environment = metadata.environment()?;
        let credential = c.credentials.credential(&environment, &metadata.tenant_id)?;
        let log_analytics = LogAnalyticsTarget {
            endpoint: environment.log_analytics_endpoint.clone(),
            credential,
        };

        c.scrapers.create_scraper(
            resource_type,
            ScraperContext {
                sink: c.sink.clone(),
                publisher: c.publisher.clone(),
                client,
                log_analytics,
            },
        )
    }
}
