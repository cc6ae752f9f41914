use std::sync::Arc;

use scrape_model::{AzureMetadata, MetricDefinition, MetricsDeclaration, ModelError};
use tracing::{debug, error, warn};

use crate::{
    bag::DefinitionBag,
    discovery::ResourceDiscovery,
    error::CoreError,
    scheduler::{ScheduledTasks, TaskScheduler},
};

const UNKNOWN_METRIC: &str = "Unknown";

/// Turns a declaration into the scrape definitions of one run.
///
/// Literal resources are bound synchronously; discovery groups are resolved in
/// scheduled tasks that append into a shared [`DefinitionBag`].
pub(crate) struct DiscoveryExpander {
    job: Arc<str>,
    declaration: Arc<MetricsDeclaration>,
    discovery: Arc<dyn ResourceDiscovery>,
}

impl DiscoveryExpander {
    pub(crate) fn new(job: Arc<str>, declaration: Arc<MetricsDeclaration>, discovery: Arc<dyn ResourceDiscovery>) -> Self {
        Self {
            job,
            declaration,
            discovery,
        }
    }

    pub(crate) async fn expand(&self, scheduler: &TaskScheduler) -> Result<DefinitionBag, CoreError> {
        let bag = DefinitionBag::new();
        let mut tasks = ScheduledTasks::new();

        let admitted = self.admit(scheduler, &mut tasks, &bag).await;
        let settled = tasks.wait_all().await;
        admitted.and(settled)?;

        debug!(job = %self.job, definitions = bag.len(), "discovery finished");
        Ok(bag)
    }

    async fn admit(&self, scheduler: &TaskScheduler, tasks: &mut ScheduledTasks, bag: &DefinitionBag) -> Result<(), CoreError> {
        for metric in &self.declaration.metrics {
            scheduler.ensure_active()?;

            let Some(metric) = metric else {
                error!(
                    job = %self.job,
                    metric = UNKNOWN_METRIC,
                    "failed to get scrape definitions for metric: definition is missing"
                );
                continue;
            };

            match self.expand_metric(metric, scheduler, tasks, bag).await {
                Ok(()) => {}
                Err(CoreError::Cancelled) => return Err(CoreError::Cancelled),
                Err(e) => error!(
                    job = %self.job,
                    metric = metric.name().unwrap_or(UNKNOWN_METRIC),
                    error = %e,
                    "failed to get scrape definitions for metric"
                ),
            }
        }
        Ok(())
    }

    async fn expand_metric(
        &self,
        metric: &MetricDefinition,
        scheduler: &TaskScheduler,
        tasks: &mut ScheduledTasks,
        bag: &DefinitionBag,
    ) -> Result<(), CoreError> {
        ensure_bindable(metric)?;
        let metadata = &self.declaration.azure_metadata;

        for group in &metric.resource_discovery_groups {
            scheduler.ensure_active()?;

            let Some(name) = group.as_ref().and_then(|g| g.usable_name()) else {
                warn!(
                    job = %self.job,
                    metric = metric.name().unwrap_or(UNKNOWN_METRIC),
                    "found resource discovery group missing a name"
                );
                continue;
            };

            let work = discover_group(
                self.job.clone(),
                name.to_string(),
                metric.clone(),
                metadata.clone(),
                self.discovery.clone(),
                bag.clone(),
            );
            scheduler.schedule(tasks, work).await?;
        }

        for resource in &metric.resources {
            let Some(resource) = resource else {
                warn!(
                    job = %self.job,
                    metric = metric.name().unwrap_or(UNKNOWN_METRIC),
                    "found null resource"
                );
                continue;
            };
            bag.push(metric.create_scrape_definition(resource.clone(), metadata)?);
        }
        Ok(())
    }
}

/// A metric without Prometheus or Azure identity cannot produce definitions.
fn ensure_bindable(metric: &MetricDefinition) -> Result<(), ModelError> {
    let Some(prometheus) = metric.prometheus_metric_definition.as_ref() else {
        return Err(ModelError::MissingPrometheusDefinition);
    };
    if metric.azure_metric_configuration.is_none() {
        return Err(ModelError::MissingAzureMetric {
            metric: prometheus.name.clone(),
        });
    }
    Ok(())
}

async fn discover_group(
    job: Arc<str>,
    group: String,
    metric: MetricDefinition,
    metadata: AzureMetadata,
    discovery: Arc<dyn ResourceDiscovery>,
    bag: DefinitionBag,
) {
    let resources = match discovery.resource_discovery_group(&group).await {
        Ok(resources) => resources,
        Err(e) => {
            error!(job = %job, group = %group, error = %e, "failed to discover resources for group");
            return;
        }
    };

    if resources.is_empty() {
        warn!(job = %job, group = %group, "discovered no resources for resource discovery group");
        return;
    }

    debug!(job = %job, group = %group, resources = resources.len(), "discovered resources");
    for resource in resources {
        match metric.create_scrape_definition(resource, &metadata) {
            Ok(def) => bag.push(def),
            Err(e) => error!(job = %job, group = %group, error = %e, "failed to bind discovered resource"),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use scrape_model::{
        AzureMetricConfiguration, MetricDefaults, PrometheusMetricDefinition, ResourceDefinition,
        ResourceDiscoveryGroup, ResourceType,
    };
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::error::ScrapeError;

    struct TwoVms;

    #[async_trait]
    impl ResourceDiscovery for TwoVms {
        async fn resource_discovery_group(&self, _name: &str) -> Result<Vec<ResourceDefinition>, ScrapeError> {
            Ok(vec![
                ResourceDefinition::resource(ResourceType::VirtualMachine, "vm-a"),
                ResourceDefinition::resource(ResourceType::VirtualMachine, "vm-b"),
            ])
        }
    }

    fn metric(name: &str) -> MetricDefinition {
        MetricDefinition {
            prometheus_metric_definition: Some(PrometheusMetricDefinition {
                name: name.into(),
                ..Default::default()
            }),
            azure_metric_configuration: Some(AzureMetricConfiguration {
                metric_name: "Percentage CPU".into(),
                ..Default::default()
            }),
            resource_type: ResourceType::VirtualMachine,
            scraping: None,
            resources: vec![Some(ResourceDefinition::resource(ResourceType::VirtualMachine, "vm-1")), None],
            resource_discovery_groups: vec![Some(ResourceDiscoveryGroup::named("vms"))],
        }
    }

    fn expander(metrics: Vec<Option<MetricDefinition>>) -> DiscoveryExpander {
        let declaration = MetricsDeclaration {
            azure_metadata: AzureMetadata {
                tenant_id: "tenant".into(),
                subscription_id: "sub".into(),
                resource_group_name: "rg".into(),
                ..Default::default()
            },
            metric_defaults: MetricDefaults::default(),
            metrics,
        };
        DiscoveryExpander::new(Arc::from("job"), Arc::new(declaration), Arc::new(TwoVms))
    }

    fn scheduler(deadline: &CancellationToken) -> TaskScheduler {
        TaskScheduler::new(Arc::from("job"), None, deadline.clone())
    }

    #[tokio::test]
    async fn null_metric_is_skipped() {
        let exp = expander(vec![None, Some(metric("vm_cpu"))]);
        let bag = exp.expand(&scheduler(&CancellationToken::new())).await.unwrap();

        let mut names: Vec<_> = bag.drain().into_iter().map(|d| d.resource_uri()).collect();
        names.sort();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|uri| uri.contains("/subscriptions/sub/")));
    }

    #[tokio::test]
    async fn unbindable_metric_is_skipped() {
        let mut broken = metric("vm_mem");
        broken.azure_metric_configuration = None;

        let exp = expander(vec![Some(broken), Some(metric("vm_cpu"))]);
        let defs = exp.expand(&scheduler(&CancellationToken::new())).await.unwrap().drain();
        assert_eq!(defs.len(), 3);
        assert!(defs.iter().all(|d| d.metric_name() == "vm_cpu"));
    }

    #[tokio::test]
    async fn cancelled_deadline_stops_expansion() {
        let deadline = CancellationToken::new();
        deadline.cancel();
        let res = expander(vec![Some(metric("vm_cpu"))]).expand(&scheduler(&deadline)).await;
        assert!(matches!(res, Err(CoreError::Cancelled)));
    }
}
