use std::time::Duration;

use scrape_model::JobState;
use uuid::Uuid;

/// Outcome of one `execute` call. Informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub job: String,
    /// Terminal state reached by the run.
    pub outcome: JobState,
    /// Scrape definitions produced by discovery.
    pub definitions: usize,
    /// Batches built, `None` when batching was off or not reached.
    pub batches: Option<usize>,
    /// Cancelled by the run timeout rather than by the caller.
    pub timed_out: bool,
    pub duration: Duration,
    pub error: Option<String>,
}

impl RunReport {
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.outcome == JobState::Completed
    }
}

#[derive(Debug, Default)]
pub(crate) struct RunStats {
    pub definitions: usize,
    pub batches: Option<usize>,
}
