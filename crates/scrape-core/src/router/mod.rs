use std::sync::Arc;

use scrape_model::ResourceType;
use tracing::{instrument, trace};

use crate::{
    error::ScrapeError,
    scraper::{Scraper, ScraperContext, ScraperFactory},
};

/// Builds scrapers for the resource types it supports.
pub trait ScraperProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn supports(&self, resource_type: ResourceType) -> bool;
    fn build(&self, ctx: ScraperContext) -> Result<Box<dyn Scraper>, ScrapeError>;
}

/// Registry of scraper providers; the first provider supporting a type wins.
#[derive(Default)]
pub struct ScraperRouter {
    providers: Vec<Arc<dyn ScraperProvider>>,
}

impl ScraperRouter {
    #[inline]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    #[inline]
    pub fn register(&mut self, provider: Arc<dyn ScraperProvider>) {
        self.providers.push(provider);
    }

    #[inline]
    pub fn with(mut self, provider: Arc<dyn ScraperProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn pick(&self, resource_type: ResourceType) -> Option<&Arc<dyn ScraperProvider>> {
        self.providers.iter().find(|p| p.supports(resource_type))
    }
}

impl ScraperFactory for ScraperRouter {
    #[instrument(level = "trace", skip(self, ctx), fields(resource_type = %resource_type))]
    fn create_scraper(&self, resource_type: ResourceType, ctx: ScraperContext) -> Result<Box<dyn Scraper>, ScrapeError> {
        let provider = self
            .pick(resource_type)
            .ok_or(ScrapeError::NoScraper(resource_type))?;

        let scraper = provider.build(ctx)?;
        trace!(provider = provider.name(), "provider built scraper");
        Ok(scraper)
    }
}
