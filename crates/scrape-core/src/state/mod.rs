mod view;
pub use view::{log_transition, message_for};

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use scrape_model::JobState;
use tracing::warn;

use crate::job::RunReport;

/// Observable lifecycle of a scraping job.
#[derive(Clone, Default)]
pub struct RunState {
    inner: Arc<RwLock<RunStateInner>>,
}

#[derive(Default)]
struct RunStateInner {
    current: JobState,
    /// Runs started so far.
    runs: u64,
    last_report: Option<RunReport>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> JobState {
        self.read().current
    }

    pub fn runs(&self) -> u64 {
        self.read().runs
    }

    /// Report of the most recently finished run.
    pub fn last_report(&self) -> Option<RunReport> {
        self.read().last_report.clone()
    }

    /// Move to `next` if the lifecycle allows it.
    ///
    /// Returns `false` (and leaves the state untouched) for an invalid transition.
    pub fn transition(&self, job: &str, next: JobState) -> bool {
        let mut inner = self.write();
        if !inner.current.can_transition_to(next) {
            warn!(
                job,
                from = inner.current.as_str(),
                to = next.as_str(),
                "ignored invalid job state transition"
            );
            return false;
        }

        if next == JobState::Discovering {
            inner.runs += 1;
        }
        inner.current = next;
        drop(inner);

        log_transition(job, next);
        true
    }

    /// Record the report of a finished run; its outcome becomes the current state.
    pub fn finish(&self, job: &str, report: RunReport) {
        let mut inner = self.write();
        if !inner.current.can_transition_to(report.outcome) {
            warn!(
                job,
                from = inner.current.as_str(),
                to = report.outcome.as_str(),
                "run finished from an unexpected state"
            );
        }
        inner.current = report.outcome;
        inner.last_report = Some(report);
    }

    fn read(&self) -> RwLockReadGuard<'_, RunStateInner> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RunStateInner> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }
}
