//! Logger setup shared by scraping agents.
mod logger;
pub use logger::*;
