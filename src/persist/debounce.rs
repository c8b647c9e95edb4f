use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Single-slot delayed task.
///
/// `schedule` arms a timer that runs the action once the delay elapses.
/// Scheduling again before that cancels the armed action and starts over, so
/// a burst of calls runs only the last action, once, a full delay after the
/// burst ends.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Arm the timer with `action`, replacing any armed action.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            debug!("Restarting debounce timer");
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => action.await,
            }
        });

        self.pending = Some(Pending { token, handle });
    }

    /// Drop the armed action, if any. Returns whether one was still
    /// outstanding.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) if !pending.handle.is_finished() => {
                pending.token.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    /// Wait for the armed action to fire on its own schedule.
    pub async fn settle(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Err(e) = pending.handle.await {
                warn!(error = %e, "Debounced task did not complete");
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
