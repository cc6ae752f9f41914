//! Declaration and runtime types shared by the scraping agent crates.
//!
//! Everything here is plain data: metrics declarations as loaded from configuration,
//! the per-run [`ScrapeDefinition`] / [`BatchScrapeDefinition`] units of work and the
//! runtime knobs read by the job orchestrator.

mod error;
pub use error::ModelError;

mod domain;
pub use domain::*;

mod config;
pub use config::*;

mod validation;
pub use validation::{MAX_METRIC_LIMIT, validate_declaration};
