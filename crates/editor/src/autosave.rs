//! Trailing-debounce autosave timer.
//!
//! [`AutosaveScheduler`] keeps at most one armed timer. Every call to
//! [`schedule`](AutosaveScheduler::schedule) cancels the previous timer and
//! starts a new one, so a burst of edits coalesces into a single save fired
//! one quiet interval after the last edit. Once a timer fires, the save job
//! runs to completion; only the waiting part is cancellable.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Debounce timer bound to a tokio runtime.
pub struct AutosaveScheduler {
    handle: Handle,
    /// Master token, cancelled on shutdown. Every timer token is a child.
    shutdown: CancellationToken,
    /// Token of the most recently armed timer.
    pending: Mutex<Option<CancellationToken>>,
}

impl AutosaveScheduler {
    /// Create a scheduler that spawns its timers on `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            shutdown: CancellationToken::new(),
            pending: Mutex::new(None),
        }
    }

    /// (Re)arm the timer: cancel any pending one and run `job` after `delay`
    /// unless cancelled first. Ignored after [`shutdown`](Self::shutdown).
    pub fn schedule<F, Fut>(&self, delay: Duration, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.shutdown.is_cancelled() {
            tracing::debug!("Autosave scheduler shut down, ignoring schedule request");
            return;
        }

        let token = self.shutdown.child_token();
        if let Some(previous) = self.pending().replace(token.clone()) {
            previous.cancel();
        }

        self.handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => job().await,
            }
        });
    }

    /// Cancel the pending timer, if any, without shutting down.
    pub fn cancel_pending(&self) {
        if let Some(token) = self.pending().take() {
            token.cancel();
        }
    }

    /// Cancel the pending timer and refuse any further scheduling.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.cancel_pending();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn pending(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
