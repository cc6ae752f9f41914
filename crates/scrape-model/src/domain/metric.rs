use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AzureMetadata, ModelError, ResourceDefinition, ResourceType, ScrapeDefinition, Scraping};

/// One declared metric and the resources it is collected from.
///
/// Resources come from a literal list, from named discovery groups, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinition {
    /// How the metric is exposed to Prometheus.
    #[serde(default)]
    pub prometheus_metric_definition: Option<PrometheusMetricDefinition>,
    /// Which Azure Monitor metric is queried and how it is aggregated.
    #[serde(default)]
    pub azure_metric_configuration: Option<AzureMetricConfiguration>,
    /// Resource type shared by the declared resources.
    pub resource_type: ResourceType,
    /// Scraping schedule; filled from the declaration defaults when unset.
    #[serde(default)]
    pub scraping: Option<Scraping>,
    /// Explicitly enumerated resources; `null` entries are skipped.
    #[serde(default)]
    pub resources: Vec<Option<ResourceDefinition>>,
    /// Discovery groups resolved on every run; `null` entries are skipped.
    #[serde(default)]
    pub resource_discovery_groups: Vec<Option<ResourceDiscoveryGroup>>,
}

/// Prometheus identity of a metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusMetricDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Static labels added to every sample.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Azure Monitor side of a metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureMetricConfiguration {
    /// Metric name as known by the monitoring API.
    pub metric_name: String,
    #[serde(default)]
    pub aggregation: Option<MetricAggregation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    /// Maximum number of time series returned per query.
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAggregation {
    #[serde(rename = "type")]
    pub aggregation_type: AggregationType,
    #[serde(default)]
    pub interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationType {
    Average,
    Total,
    Minimum,
    Maximum,
    Count,
}

/// Reference to a named resource discovery group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDiscoveryGroup {
    #[serde(default)]
    pub name: Option<String>,
}

impl ResourceDiscoveryGroup {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Group name, unless it is missing or blank.
    pub fn usable_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }
}

impl MetricDefinition {
    /// Prometheus metric name, if one is declared.
    pub fn name(&self) -> Option<&str> {
        self.prometheus_metric_definition
            .as_ref()
            .map(|p| p.name.as_str())
    }

    /// Whether resources come from discovery, a literal list, or both.
    pub fn has_resource_source(&self) -> bool {
        !self.resources.is_empty() || !self.resource_discovery_groups.is_empty()
    }

    /// Bind this metric to one concrete resource.
    ///
    /// Subscription and resource group fall back to the declaration metadata when the
    /// resource does not override them.
    pub fn create_scrape_definition(
        &self,
        resource: ResourceDefinition,
        metadata: &AzureMetadata,
    ) -> Result<ScrapeDefinition, ModelError> {
        let prometheus = self
            .prometheus_metric_definition
            .clone()
            .ok_or(ModelError::MissingPrometheusDefinition)?;
        let azure = self.azure_metric_configuration.clone().ok_or_else(|| {
            ModelError::MissingAzureMetric {
                metric: prometheus.name.clone(),
            }
        })?;

        let subscription_id = resource
            .subscription_override()
            .unwrap_or(&metadata.subscription_id)
            .to_string();
        let resource_group_name = resource
            .resource_group_override()
            .unwrap_or(&metadata.resource_group_name)
            .to_string();

        Ok(ScrapeDefinition {
            resource,
            azure_metric_configuration: azure,
            prometheus_metric_definition: prometheus,
            scraping: self.scraping.clone().unwrap_or_default(),
            subscription_id,
            resource_group_name,
        })
    }
}
