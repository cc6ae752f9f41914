use crate::{
    AzureMetricConfiguration, PrometheusMetricDefinition, ResourceDefinition, ResourceType, Scraping,
};

/// One unit of work: a single resource bound to a single metric.
///
/// Built fresh on every run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScrapeDefinition {
    pub resource: ResourceDefinition,
    pub azure_metric_configuration: AzureMetricConfiguration,
    pub prometheus_metric_definition: PrometheusMetricDefinition,
    pub scraping: Scraping,
    /// Effective subscription: resource override or declaration default.
    pub subscription_id: String,
    /// Effective resource group: resource override or declaration default.
    pub resource_group_name: String,
}

impl ScrapeDefinition {
    #[inline]
    pub fn resource_type(&self) -> ResourceType {
        self.resource.resource_type
    }

    #[inline]
    pub fn metric_name(&self) -> &str {
        &self.prometheus_metric_definition.name
    }

    pub fn resource_uri(&self) -> String {
        self.resource
            .resource_uri(&self.subscription_id, &self.resource_group_name)
    }
}

/// Properties shared by every member of a [`BatchScrapeDefinition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeDefinitionBatchProperties {
    pub subscription_id: String,
    pub resource_type: ResourceType,
    pub azure_metric_configuration: AzureMetricConfiguration,
    pub prometheus_metric_definition: PrometheusMetricDefinition,
    pub scraping: Scraping,
}

impl ScrapeDefinitionBatchProperties {
    /// Header taken from the first member of a batch.
    pub fn from_definition(def: &ScrapeDefinition) -> Self {
        Self {
            subscription_id: def.subscription_id.clone(),
            resource_type: def.resource_type(),
            azure_metric_configuration: def.azure_metric_configuration.clone(),
            prometheus_metric_definition: def.prometheus_metric_definition.clone(),
            scraping: def.scraping.clone(),
        }
    }
}

/// Scrape definitions merged into one remote call.
///
/// Members keep the order in which they were grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchScrapeDefinition {
    pub properties: ScrapeDefinitionBatchProperties,
    pub scrape_definitions: Vec<ScrapeDefinition>,
}

impl BatchScrapeDefinition {
    pub fn new(properties: ScrapeDefinitionBatchProperties, scrape_definitions: Vec<ScrapeDefinition>) -> Self {
        Self {
            properties,
            scrape_definitions,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scrape_definitions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scrape_definitions.is_empty()
    }

    pub fn metric_name(&self) -> &str {
        &self.properties.prometheus_metric_definition.name
    }

    pub fn azure_metric_name(&self) -> &str {
        &self.properties.azure_metric_configuration.metric_name
    }
}
