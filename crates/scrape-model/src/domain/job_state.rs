use serde::{Deserialize, Serialize};

/// Phase of a scraping job run.
///
/// A run walks `Idle → Discovering → (Batching) → Scraping → Completed`;
/// `Cancelled` and `Failed` can be reached from any non-terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobState {
    /// No run in progress yet.
    #[default]
    Idle,
    /// Expanding the declaration into scrape definitions.
    Discovering,
    /// Grouping scrape definitions into batches.
    Batching,
    /// Executing scrapes.
    Scraping,
    /// Run finished; individual scrapes may still have failed.
    Completed,
    /// Caller cancellation or run timeout fired.
    Cancelled,
    /// Orchestration itself failed.
    Failed,
}

impl JobState {
    /// Returns `true` if the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Cancelled | JobState::Failed)
    }

    /// Returns `true` while a run is in one of its working phases.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobState::Discovering | JobState::Batching | JobState::Scraping
        )
    }

    /// Whether moving from `self` to `next` follows the run lifecycle.
    ///
    /// A terminal state may only move to `Discovering`, which starts the next run.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (Idle | Completed | Cancelled | Failed, Discovering) => true,
            (Discovering, Batching | Scraping) => true,
            (Batching, Scraping) => true,
            (Scraping, Completed) => true,
            (Idle | Discovering | Batching | Scraping, Cancelled | Failed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Discovering => "discovering",
            JobState::Batching => "batching",
            JobState::Scraping => "scraping",
            JobState::Completed => "completed",
            JobState::Cancelled => "cancelled",
            JobState::Failed => "failed",
        }
    }
}
