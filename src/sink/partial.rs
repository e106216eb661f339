//! Partial delivery: every fragment reaches the handler as it arrives.

use bytes::Bytes;

use crate::callback::Callback;
use crate::error::Error;
use crate::protocol::Frame;
use crate::sink::{DeliverPart, MessageSink};

/// Hands each fragment to the handler together with its `fin` flag.
///
/// Once a fragment fails, the rest of that message is refused with the
/// same error, so the handler never sees a message without its start.
pub struct PartialMessageSink {
    deliver: DeliverPart,
    /// Set after a failed fragment; cleared by the message's `fin` frame.
    discarding: Option<Error>,
}

impl PartialMessageSink {
    pub(crate) fn new(deliver: DeliverPart) -> Self {
        Self {
            deliver,
            discarding: None,
        }
    }
}

impl MessageSink for PartialMessageSink {
    fn accept(&mut self, frame: Frame, callback: Callback) {
        let last = frame.fin;

        if let Some(err) = &self.discarding {
            let err = err.clone();
            if last {
                self.discarding = None;
            }
            callback.failed(err);
            return;
        }

        let payload: Bytes = frame.into_payload();
        match (self.deliver)(payload, last) {
            Ok(()) => callback.succeeded(),
            Err(err) => {
                tracing::debug!(error = %err, "discarding rest of partial message");
                if !last {
                    self.discarding = Some(err.clone());
                }
                callback.failed(err);
            }
        }
    }
}
