//! Scraping job orchestration.
//!
//! A [`ScrapingJob`] expands a metrics declaration into scrape definitions, optionally
//! batches them and scrapes them under bounded concurrency. Remote services are reached
//! only through the collaborator traits re-exported here.

pub mod error;
pub use error::{CoreError, ScrapeError};

pub mod gate;
pub use gate::{AdmissionGate, GatePermit};

pub mod bag;
pub use bag::DefinitionBag;

pub mod deadline;
pub use deadline::RunDeadline;

pub mod scheduler;
pub use scheduler::{ScheduledTasks, TaskScheduler};

pub mod batch;
pub use batch::group_scrape_definitions;

pub mod discovery;
pub use discovery::ResourceDiscovery;

pub mod client;
pub use client::{
    ClientBuilder, ClientContext, InMemoryMetricDefinitionCache, MetricDefinitionCache,
    MonitorClient, MonitorClientCache, MonitorClientFactory,
};

pub mod credential;
pub use credential::{Credential, CredentialProvider, EnvironmentCredentialProvider};

pub mod sink;
pub use sink::{MetricSink, SystemMetricsPublisher};

pub mod scraper;
pub use scraper::{
    LogAnalyticsTarget, MonitorScraper, MonitorScraperProvider, Scraper, ScraperContext,
    ScraperFactory,
};

pub mod router;
pub use router::{ScraperProvider, ScraperRouter};

pub mod state;
pub use state::RunState;

mod expand;
mod execute;

pub mod job;
pub use job::{Collaborators, RunReport, ScrapingJob, verify_common_schedule};
