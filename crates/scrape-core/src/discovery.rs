use async_trait::async_trait;
use scrape_model::ResourceDefinition;

use crate::error::ScrapeError;

/// Resolves a named resource discovery group into concrete resources.
#[async_trait]
pub trait ResourceDiscovery: Send + Sync {
    /// Resources currently in the group. An empty list is a valid answer.
    async fn resource_discovery_group(&self, name: &str) -> Result<Vec<ResourceDefinition>, ScrapeError>;
}
