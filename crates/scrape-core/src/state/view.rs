use scrape_model::JobState;
use tracing::{debug, error, info, trace, warn};

#[inline]
pub fn message_for(state: JobState) -> &'static str {
    match state {
        JobState::Idle => "job idle (waiting for next run)",
        JobState::Discovering => "discovering scrape definitions",
        JobState::Batching => "grouping scrape definitions into batches",
        JobState::Scraping => "scraping metrics",
        JobState::Completed => "scraping run completed",
        JobState::Cancelled => "cancelled scraping metrics for job",
        JobState::Failed => "failed to scrape metrics for job",
    }
}

#[inline]
pub fn log_transition(job: &str, state: JobState) {
    let msg = message_for(state);

    match state {
        JobState::Idle => trace!(job, "{msg}"),
        JobState::Discovering => debug!(job, "{msg}"),
        JobState::Batching => debug!(job, "{msg}"),
        JobState::Scraping => debug!(job, "{msg}"),
        JobState::Completed => info!(job, "{msg}"),
        JobState::Cancelled => warn!(job, "{msg}"),
        JobState::Failed => error!(job, "{msg}"),
    }
}
