//! Routing of data frames to the text and binary sinks.

use crate::callback::Callback;
use crate::protocol::{Frame, OpCode};
use crate::sink::{MessageSink, SinkKind};

/// Owns the connection's message sinks and tracks which one receives the
/// fragments of the message in progress.
///
/// The active sink is kept as a [`SinkKind`] rather than a reference, so it
/// can only ever point at one of the two owned sinks. It is set by the first
/// frame of a message and cleared by the frame carrying `fin`.
#[derive(Default)]
pub struct SinkManager {
    text: Option<Box<dyn MessageSink>>,
    binary: Option<Box<dyn MessageSink>>,
    active: Option<SinkKind>,
}

impl SinkManager {
    #[must_use]
    pub fn new(text: Option<Box<dyn MessageSink>>, binary: Option<Box<dyn MessageSink>>) -> Self {
        Self {
            text,
            binary,
            active: None,
        }
    }

    #[must_use]
    pub fn has_text_sink(&self) -> bool {
        self.text.is_some()
    }

    #[must_use]
    pub fn has_binary_sink(&self) -> bool {
        self.binary.is_some()
    }

    /// Sink receiving the fragments of the message in progress.
    #[must_use]
    pub fn active(&self) -> Option<SinkKind> {
        self.active
    }

    /// Whether a fragmented message is in progress.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        self.active.is_some()
    }

    fn sink_mut(&mut self, kind: SinkKind) -> Option<&mut Box<dyn MessageSink>> {
        match kind {
            SinkKind::Text => self.text.as_mut(),
            SinkKind::Binary => self.binary.as_mut(),
        }
    }

    /// Route a TEXT, BINARY or CONTINUATION frame.
    ///
    /// Frames with no sink to go to (no handler registered for their type,
    /// or a continuation with no message in progress) are dropped, and
    /// their callback is completed successfully.
    pub fn accept_message(&mut self, frame: Frame, callback: Callback) {
        let fin = frame.fin;

        if self.active.is_none() {
            self.active = match frame.opcode {
                OpCode::Text if self.text.is_some() => Some(SinkKind::Text),
                OpCode::Binary if self.binary.is_some() => Some(SinkKind::Binary),
                _ => None,
            };
        }

        let active = self.active;
        match active.and_then(|kind| self.sink_mut(kind)) {
            Some(sink) => sink.accept(frame, callback),
            None => {
                tracing::debug!(
                    opcode = %frame.opcode,
                    fin,
                    len = frame.payload_len(),
                    "no message sink for frame, dropping payload"
                );
                callback.succeeded();
            }
        }

        if fin {
            self.active = None;
        }
    }

    /// Drop both sinks and any message in progress.
    pub fn release(&mut self) {
        self.active = None;
        self.text = None;
        self.binary = None;
    }
}

impl std::fmt::Debug for SinkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkManager")
            .field("text", &self.text.is_some())
            .field("binary", &self.binary.is_some())
            .field("active", &self.active)
            .finish()
    }
}
