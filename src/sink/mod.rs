//! Message sinks: per-type accumulators that feed text and binary handlers.
//!
//! A sink receives every data frame of a message, owns buffering and
//! whole-vs-partial delivery, and acknowledges each frame's callback itself.
//! Sinks are built once per connection, when the endpoint opens, by binding
//! the user's handler to the live [`Session`].

mod partial;
mod whole;

use std::sync::Arc;

use bytes::Bytes;

pub use partial::PartialMessageSink;
pub use whole::WholeMessageSink;

use crate::callback::Callback;
use crate::endpoint::bindings::{BinaryBinding, TextBinding};
use crate::error::{Error, HandlerPhase, Result};
use crate::protocol::{Frame, Utf8Decoder};
use crate::session::Session;

/// Bound delivery of a complete message.
pub(crate) type Deliver<T> = Box<dyn FnMut(T) -> Result<()> + Send>;

/// Bound delivery of one fragment and its `last` flag.
pub(crate) type DeliverPart = Box<dyn FnMut(Bytes, bool) -> Result<()> + Send>;

/// Accumulator for one message type.
pub trait MessageSink: Send {
    /// Take one data frame. The sink must complete `callback` exactly once.
    fn accept(&mut self, frame: Frame, callback: Callback);
}

/// The two message types a sink can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Text,
    Binary,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::Text => f.write_str("text"),
            SinkKind::Binary => f.write_str("binary"),
        }
    }
}

/// Build the text sink for `binding`, bound to `session`.
#[must_use]
pub fn text_sink(binding: &TextBinding, session: &Arc<Session>) -> Box<dyn MessageSink> {
    let session = Arc::clone(session);
    let limits = session.config().limits.clone();
    match binding {
        TextBinding::Whole(handler) => {
            let handler = Arc::clone(handler);
            Box::new(WholeMessageSink::new(
                limits,
                Box::new(move |message: Bytes| {
                    let text = String::from_utf8(message.to_vec())?;
                    handler(&session, text).map_err(|cause| {
                        Error::handler(session.endpoint(), HandlerPhase::Text, cause)
                    })
                }),
            ))
        }
        TextBinding::Partial(handler) => {
            let handler = Arc::clone(handler);
            let mut decoder = Utf8Decoder::new();
            Box::new(PartialMessageSink::new(Box::new(
                move |fragment: Bytes, last| {
                    let text = decoder.decode(&fragment, last)?;
                    handler(&session, text, last).map_err(|cause| {
                        Error::handler(session.endpoint(), HandlerPhase::Text, cause)
                    })
                },
            )))
        }
    }
}

/// Build the binary sink for `binding`, bound to `session`.
#[must_use]
pub fn binary_sink(binding: &BinaryBinding, session: &Arc<Session>) -> Box<dyn MessageSink> {
    let session = Arc::clone(session);
    let limits = session.config().limits.clone();
    match binding {
        BinaryBinding::Whole(handler) => {
            let handler = Arc::clone(handler);
            Box::new(WholeMessageSink::new(
                limits,
                Box::new(move |message: Bytes| {
                    handler(&session, message).map_err(|cause| {
                        Error::handler(session.endpoint(), HandlerPhase::Binary, cause)
                    })
                }),
            ))
        }
        BinaryBinding::Partial(handler) => {
            let handler = Arc::clone(handler);
            Box::new(PartialMessageSink::new(Box::new(
                move |fragment: Bytes, last| {
                    handler(&session, fragment, last).map_err(|cause| {
                        Error::handler(session.endpoint(), HandlerPhase::Binary, cause)
                    })
                },
            )))
        }
    }
}
