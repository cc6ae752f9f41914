use std::{future::Future, sync::Arc};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, trace};

use crate::{error::CoreError, gate::AdmissionGate};

/// Spawns units of work for one run phase, admitted through the job's gate.
///
/// Gated units are raced against the run deadline. When the deadline wins the unit
/// is abandoned: its outcome becomes [`CoreError::Cancelled`] and its slot is freed,
/// but the spawned future itself keeps running unobserved. Without a gate units run
/// immediately and are awaited to completion.
pub struct TaskScheduler {
    job: Arc<str>,
    gate: Option<AdmissionGate>,
    deadline: CancellationToken,
}

/// Handles of the units scheduled in one phase.
///
/// Handles are detached rather than aborted when dropped.
#[derive(Default)]
pub struct ScheduledTasks {
    handles: Vec<JoinHandle<Result<(), CoreError>>>,
}

impl TaskScheduler {
    pub fn new(job: Arc<str>, gate: Option<AdmissionGate>, deadline: CancellationToken) -> Self {
        Self {
            job,
            gate,
            deadline,
        }
    }

    #[inline]
    pub fn deadline(&self) -> &CancellationToken {
        &self.deadline
    }

    /// Fails with [`CoreError::Cancelled`] once the run deadline has fired.
    #[inline]
    pub fn ensure_active(&self) -> Result<(), CoreError> {
        if self.deadline.is_cancelled() {
            Err(CoreError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Admit `work` and spawn it.
    ///
    /// With a gate this waits for a free slot first; the wait itself and the unit
    /// are both cut short by the run deadline. Without a gate the work starts
    /// immediately and is not raced.
    pub async fn schedule<F>(&self, tasks: &mut ScheduledTasks, work: F) -> Result<(), CoreError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Some(gate) = &self.gate else {
            self.ensure_active()?;
            let handle = tokio::spawn(work);
            tasks.handles.push(tokio::spawn(async move {
                handle.await.map_err(|e| CoreError::TaskPanicked(e.to_string()))
            }));
            return Ok(());
        };

        let permit = gate.acquire(&self.deadline).await?;
        let job = self.job.clone();
        let deadline = self.deadline.clone();
        tasks.handles.push(tokio::spawn(async move {
            let outcome = race_deadline(&job, work, &deadline).await;
            drop(permit);
            trace!(job = %job, "released admission slot");
            outcome
        }));
        Ok(())
    }
}

impl ScheduledTasks {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every scheduled unit.
    ///
    /// Returns [`CoreError::Cancelled`] if any unit was abandoned, otherwise the first
    /// other failure (a panicking unit surfaces as [`CoreError::TaskPanicked`]).
    pub async fn wait_all(self) -> Result<(), CoreError> {
        let mut cancelled = false;
        let mut failure = None;

        for handle in self.handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(CoreError::Cancelled)) => cancelled = true,
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(join) => {
                    failure.get_or_insert(CoreError::TaskPanicked(join.to_string()));
                }
            }
        }

        match (cancelled, failure) {
            (true, _) => Err(CoreError::Cancelled),
            (false, Some(e)) => Err(e),
            (false, None) => Ok(()),
        }
    }
}

async fn race_deadline<F>(job: &str, work: F, deadline: &CancellationToken) -> Result<(), CoreError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let mut handle = tokio::spawn(work);
    tokio::select! {
        biased;
        joined = &mut handle => joined.map_err(|e| CoreError::TaskPanicked(e.to_string())),
        _ = deadline.cancelled() => {
            error!(
                job = %job,
                "scrape job was cancelled due to timeout, dangling async tasks may keep running for an \
                 unbounded amount of time; if many such timeouts occur consider restarting the agent \
                 or tuning the mutex timeout"
            );
            Err(CoreError::Cancelled)
        }
    }
}
