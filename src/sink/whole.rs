//! Whole-message delivery: fragments are joined before the handler runs.

use bytes::{Bytes, BytesMut};

use crate::callback::Callback;
use crate::config::Limits;
use crate::error::{Error, Result};
use crate::protocol::Frame;
use crate::sink::{Deliver, MessageSink};

/// Buffers a fragmented message and delivers it once the final frame lands.
pub struct WholeMessageSink {
    buffer: BytesMut,
    fragment_count: usize,
    limits: Limits,
    /// Set after a limit violation; the rest of that message is refused.
    discarding: Option<Error>,
    deliver: Deliver<Bytes>,
}

impl WholeMessageSink {
    pub(crate) fn new(limits: Limits, deliver: Deliver<Bytes>) -> Self {
        Self {
            buffer: BytesMut::new(),
            fragment_count: 0,
            limits,
            discarding: None,
            deliver,
        }
    }

    /// Whether part of a message is buffered.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.fragment_count > 0
    }

    /// Add a frame; returns the complete message when `fin` is set.
    fn push(&mut self, frame: &Frame) -> Result<Option<Bytes>> {
        if let Some(err) = &self.discarding {
            let err = err.clone();
            if frame.fin {
                self.discarding = None;
            }
            return Err(err);
        }

        if let Err(err) = self.check_limits(frame) {
            tracing::debug!(error = %err, "discarding oversized message");
            self.reset();
            if !frame.fin {
                self.discarding = Some(err.clone());
            }
            return Err(err);
        }

        self.buffer.extend_from_slice(frame.payload());
        self.fragment_count += 1;

        if frame.fin {
            self.fragment_count = 0;
            Ok(Some(self.buffer.split().freeze()))
        } else {
            Ok(None)
        }
    }

    fn check_limits(&self, frame: &Frame) -> Result<()> {
        self.limits
            .check_fragment_count(self.fragment_count + 1)?;
        self.limits
            .check_message_size(self.buffer.len() + frame.payload_len())
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.fragment_count = 0;
    }
}

impl MessageSink for WholeMessageSink {
    fn accept(&mut self, frame: Frame, callback: Callback) {
        match self.push(&frame) {
            Ok(Some(message)) => match (self.deliver)(message) {
                Ok(()) => callback.succeeded(),
                Err(err) => callback.failed(err),
            },
            Ok(None) => callback.succeeded(),
            Err(err) => callback.failed(err),
        }
    }
}
