use std::{sync::Arc, time::Duration};

use scrape_model::ConcurrencyConfig;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// Job-lifetime cap on concurrently running discovery and scrape work.
///
/// Cloning shares the underlying permits.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
    timeout: Duration,
}

/// Slot held by one unit of work; released on drop.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Gate admitting at most `capacity` holders (at least one).
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            timeout,
        }
    }

    /// Gate described by the concurrency settings, `None` when unbounded.
    pub fn from_config(cfg: &ConcurrencyConfig) -> Option<Self> {
        cfg.gate_capacity()
            .map(|capacity| Self::new(capacity, cfg.mutex_timeout()))
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Longest a run using this gate lasts before its gated work is abandoned.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Free slots right now.
    #[inline]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free slot unless `deadline` fires first.
    pub async fn acquire(&self, deadline: &CancellationToken) -> Result<GatePermit, CoreError> {
        tokio::select! {
            biased;
            _ = deadline.cancelled() => Err(CoreError::Cancelled),
            permit = self.permits.clone().acquire_owned() => permit
                .map(|p| GatePermit { _permit: p })
                .map_err(|_| CoreError::GateClosed),
        }
    }
}
