use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancellation token of one run: fires on caller cancellation or after `timeout`.
///
/// The timer stops when the deadline is dropped.
pub struct RunDeadline {
    caller: CancellationToken,
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl RunDeadline {
    pub fn start(caller: &CancellationToken, timeout: Duration) -> Self {
        let token = caller.child_token();
        let fire = token.clone();
        let timer = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => fire.cancel(),
                _ = fire.cancelled() => {}
            }
        });

        Self {
            caller: caller.clone(),
            token,
            timer,
        }
    }

    #[inline]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline fired on its own timer rather than through the caller.
    pub fn timed_out(&self) -> bool {
        self.token.is_cancelled() && !self.caller.is_cancelled()
    }
}

impl Drop for RunDeadline {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
