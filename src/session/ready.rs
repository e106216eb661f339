//! One-shot "session ready" signal.
//!
//! The signal settles exactly once: either with the opened session or with
//! the first error reported before the open sequence finished. It may be
//! settled from a different thread than the one dispatching frames, so the
//! first writer wins atomically and later attempts are no-ops.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::session::Session;

struct Shared {
    outcome: OnceLock<Result<Arc<Session>>>,
    #[cfg(feature = "async-tokio")]
    notify: tokio::sync::Notify,
}

/// Cloneable handle to a connection's ready signal.
#[derive(Clone)]
pub struct SessionFuture {
    shared: Arc<Shared>,
}

impl Default for SessionFuture {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFuture {
    /// Create an unsettled signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                outcome: OnceLock::new(),
                #[cfg(feature = "async-tokio")]
                notify: tokio::sync::Notify::new(),
            }),
        }
    }

    /// Settle with the opened session. Returns `false` if already settled.
    pub fn complete(&self, session: Arc<Session>) -> bool {
        self.settle(Ok(session))
    }

    /// Settle with a failure. Returns `false` if already settled.
    pub fn fail(&self, err: Error) -> bool {
        self.settle(Err(err))
    }

    fn settle(&self, outcome: Result<Arc<Session>>) -> bool {
        let won = self.shared.outcome.set(outcome).is_ok();
        if won {
            self.wake_waiters();
        }
        won
    }

    #[cfg(feature = "async-tokio")]
    fn wake_waiters(&self) {
        self.shared.notify.notify_waiters();
    }

    #[cfg(not(feature = "async-tokio"))]
    fn wake_waiters(&self) {}

    /// Whether the signal has settled.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.shared.outcome.get().is_some()
    }

    /// Whether the signal settled with a failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.shared.outcome.get(), Some(Err(_)))
    }

    /// The settled outcome, if any.
    #[must_use]
    pub fn result(&self) -> Option<Result<Arc<Session>>> {
        self.shared.outcome.get().cloned()
    }

    /// Wait until the signal settles.
    ///
    /// # Errors
    ///
    /// Returns the error the signal was failed with.
    #[cfg(feature = "async-tokio")]
    pub async fn wait(&self) -> Result<Arc<Session>> {
        loop {
            let mut notified = std::pin::pin!(self.shared.notify.notified());
            // Register before checking so a settle in between is not missed.
            notified.as_mut().enable();
            if let Some(outcome) = self.result() {
                return outcome;
            }
            notified.await;
        }
    }
}

impl fmt::Debug for SessionFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.shared.outcome.get() {
            None => "pending",
            Some(Ok(_)) => "completed",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("SessionFuture").field("state", &state).finish()
    }
}
