use std::{
    collections::HashMap,
    sync::RwLock,
};

/// Cache of the metric names a resource supports, shared by all clients.
pub trait MetricDefinitionCache: Send + Sync {
    fn get(&self, resource_uri: &str) -> Option<Vec<String>>;
    fn insert(&self, resource_uri: String, metric_names: Vec<String>);
}

#[derive(Default)]
pub struct InMemoryMetricDefinitionCache {
    entries: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemoryMetricDefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricDefinitionCache for InMemoryMetricDefinitionCache {
    fn get(&self, resource_uri: &str) -> Option<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries.get(resource_uri).cloned()
    }

    fn insert(&self, resource_uri: String, metric_names: Vec<String>) {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.insert(resource_uri, metric_names);
    }
}
