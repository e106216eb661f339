//! One-shot frame acknowledgment.
//!
//! Every frame handed to the dispatcher comes with a [`Callback`]. Completing
//! it returns the frame's flow-control credit to the transport, so it must be
//! completed exactly once. Both completion methods consume the callback,
//! which rules out completing it twice; dropping one without completing it is
//! reported as a warning.

use std::fmt;

use crate::error::{Error, Result};

type Completion = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// One-shot acknowledgment for a dispatched frame.
pub struct Callback {
    completion: Option<Completion>,
}

impl Callback {
    /// Create a callback that runs `f` with the outcome.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        Self {
            completion: Some(Box::new(f)),
        }
    }

    /// A callback that ignores its outcome.
    #[must_use]
    pub fn noop() -> Self {
        Self { completion: None }
    }

    /// Report that the frame was consumed.
    pub fn succeeded(mut self) {
        self.complete(Ok(()));
    }

    /// Report that the frame could not be consumed.
    pub fn failed(mut self, err: Error) {
        self.complete(Err(err));
    }

    fn complete(&mut self, outcome: Result<()>) {
        if let Some(completion) = self.completion.take() {
            completion(outcome);
        }
    }
}

impl Drop for Callback {
    fn drop(&mut self) {
        if self.completion.is_some() {
            tracing::warn!("frame callback dropped without acknowledgment");
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("pending", &self.completion.is_some())
            .finish()
    }
}
