//! Stand-ins for the cloud APIs so the agent runs without credentials.

use std::{
    collections::BTreeMap,
    hash::{DefaultHasher, Hash, Hasher},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use scrape_core::{
    ClientBuilder, ClientContext, MetricDefinitionCache, MonitorClient, ResourceDiscovery,
    ScrapeError,
};
use scrape_model::{MeasuredValue, ResourceDefinition, ScrapeDefinition};
use tracing::debug;

use crate::config::SimulatedGroup;

const DIMENSION_VALUES: [&str; 4] = ["GetBlob", "PutBlob", "ListBlobs", "DeleteBlob"];

/// Discovery groups with generated resource names.
pub struct SimulatedDiscovery {
    groups: BTreeMap<String, SimulatedGroup>,
    latency: Duration,
}

impl SimulatedDiscovery {
    pub fn new(groups: BTreeMap<String, SimulatedGroup>) -> Self {
        Self {
            groups,
            latency: Duration::from_millis(50),
        }
    }
}

#[async_trait]
impl ResourceDiscovery for SimulatedDiscovery {
    async fn resource_discovery_group(&self, name: &str) -> Result<Vec<ResourceDefinition>, ScrapeError> {
        tokio::time::sleep(self.latency).await;
        let group = self.groups.get(name).ok_or_else(|| ScrapeError::Discovery {
            group: name.to_string(),
            reason: "group is not defined".into(),
        })?;

        Ok((0..group.count)
            .map(|i| ResourceDefinition::resource(group.resource_type, format!("{name}-{i}")))
            .collect())
    }
}

/// Builds one [`SimulatedClient`] per tenant and subscription.
#[derive(Default)]
pub struct SimulatedClientBuilder;

impl ClientBuilder for SimulatedClientBuilder {
    fn build(&self, ctx: &ClientContext<'_>) -> Result<Arc<dyn MonitorClient>, ScrapeError> {
        Ok(Arc::new(SimulatedClient {
            tenant_id: ctx.tenant_id.to_string(),
            subscription_id: ctx.subscription_id.to_string(),
            definitions: ctx.definition_cache.clone(),
            queries: AtomicU64::new(0),
        }))
    }
}

/// Answers metric queries with values that drift slowly per resource.
pub struct SimulatedClient {
    tenant_id: String,
    subscription_id: String,
    definitions: Arc<dyn MetricDefinitionCache>,
    queries: AtomicU64,
}

impl SimulatedClient {
    fn ensure_defined(&self, def: &ScrapeDefinition) -> Result<(), ScrapeError> {
        let uri = def.resource_uri();
        let metric = &def.azure_metric_configuration.metric_name;

        let known = match self.definitions.get(&uri) {
            Some(names) => names,
            None => {
                debug!(resource = %uri, "loading metric definitions");
                let names = vec![metric.clone()];
                self.definitions.insert(uri.clone(), names.clone());
                names
            }
        };

        if known.iter().any(|n| n == metric) {
            Ok(())
        } else {
            Err(ScrapeError::Remote(format!("metric {metric} is not defined for {uri}")))
        }
    }
}

#[async_trait]
impl MonitorClient for SimulatedClient {
    fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    async fn query(&self, def: &ScrapeDefinition) -> Result<Vec<MeasuredValue>, ScrapeError> {
        self.ensure_defined(def)?;
        let tick = self.queries.fetch_add(1, Ordering::Relaxed);
        let base = value_for(&def.resource_uri(), tick);

        let cfg = &def.azure_metric_configuration;
        let Some(dimension) = cfg.dimensions.first() else {
            return Ok(vec![MeasuredValue::new(base)]);
        };

        let limit = cfg.limit.map_or(DIMENSION_VALUES.len(), |l| l as usize);
        Ok(DIMENSION_VALUES
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, value)| MeasuredValue::new(base * (i + 1) as f64).with_dimension(dimension, *value))
            .collect())
    }
}

fn value_for(resource_uri: &str, tick: u64) -> f64 {
    let mut hasher = DefaultHasher::new();
    resource_uri.hash(&mut hasher);
    let seed = hasher.finish() % 50;
    (seed + tick % 10) as f64
}
