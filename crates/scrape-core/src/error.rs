use scrape_model::{ModelError, ResourceType};
use thiserror::Error;

/// Failure of a collaborator while discovering or scraping one unit of work.
///
/// These never abort a run: the caller logs them and moves on.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("resource discovery failed for group {group}: {reason}")]
    Discovery { group: String, reason: String },
    #[error("monitor client unavailable for subscription {subscription}: {reason}")]
    Client { subscription: String, reason: String },
    #[error("credential unavailable: {0}")]
    Credential(String),
    #[error("no scraper registered for resource type {0}")]
    NoScraper(ResourceType),
    #[error("remote call failed: {0}")]
    Remote(String),
    #[error("metric sink rejected sample: {0}")]
    Sink(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Orchestration error of a scraping job.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("cancelled")]
    Cancelled,
    #[error(
        "The \"{schedule}\" scraping schedule for metricsDeclaration.Metrics[{index}] does not share the common scraping schedule \"{common}\"."
    )]
    ScheduleMismatch {
        index: usize,
        schedule: String,
        common: String,
    },
    #[error("invalid job: {0}")]
    InvalidJob(String),
    #[error("admission gate closed")]
    GateClosed,
    #[error("scheduled task panicked: {0}")]
    TaskPanicked(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
}

impl CoreError {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}
