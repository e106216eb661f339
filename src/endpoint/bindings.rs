//! Endpoint handler bindings.
//!
//! Each event an endpoint can react to has an optional handler. The set is
//! fixed before the connection opens; a missing handler makes its event a
//! no-op. Handlers receive the [`Session`] explicitly, which is how they are
//! bound to the live connection once it opens.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{BoxError, Error};
use crate::protocol::CloseCode;
use crate::session::Session;

/// Outcome of a user handler.
pub type HandlerResult = std::result::Result<(), BoxError>;

pub type OpenHandler = Arc<dyn Fn(&Session) -> HandlerResult + Send + Sync>;
pub type CloseHandler = Arc<dyn Fn(&Session, CloseCode, &str) -> HandlerResult + Send + Sync>;
/// Error handlers may run before the session exists.
pub type ErrorHandler = Arc<dyn Fn(Option<&Session>, &Error) -> HandlerResult + Send + Sync>;
pub type PongHandler = Arc<dyn Fn(&Session, Bytes) -> HandlerResult + Send + Sync>;
pub type TextHandler = Arc<dyn Fn(&Session, String) -> HandlerResult + Send + Sync>;
pub type PartialTextHandler = Arc<dyn Fn(&Session, String, bool) -> HandlerResult + Send + Sync>;
pub type BinaryHandler = Arc<dyn Fn(&Session, Bytes) -> HandlerResult + Send + Sync>;
pub type PartialBinaryHandler = Arc<dyn Fn(&Session, Bytes, bool) -> HandlerResult + Send + Sync>;

/// How text messages reach the handler.
#[derive(Clone)]
pub enum TextBinding {
    /// Once complete, as one string.
    Whole(TextHandler),
    /// Fragment by fragment, with a `last` flag.
    Partial(PartialTextHandler),
}

impl TextBinding {
    pub fn whole<F>(f: F) -> Self
    where
        F: Fn(&Session, String) -> HandlerResult + Send + Sync + 'static,
    {
        TextBinding::Whole(Arc::new(f))
    }

    pub fn partial<F>(f: F) -> Self
    where
        F: Fn(&Session, String, bool) -> HandlerResult + Send + Sync + 'static,
    {
        TextBinding::Partial(Arc::new(f))
    }
}

/// How binary messages reach the handler.
#[derive(Clone)]
pub enum BinaryBinding {
    /// Once complete, as one buffer.
    Whole(BinaryHandler),
    /// Fragment by fragment, with a `last` flag.
    Partial(PartialBinaryHandler),
}

impl BinaryBinding {
    pub fn whole<F>(f: F) -> Self
    where
        F: Fn(&Session, Bytes) -> HandlerResult + Send + Sync + 'static,
    {
        BinaryBinding::Whole(Arc::new(f))
    }

    pub fn partial<F>(f: F) -> Self
    where
        F: Fn(&Session, Bytes, bool) -> HandlerResult + Send + Sync + 'static,
    {
        BinaryBinding::Partial(Arc::new(f))
    }
}

/// The full set of optional handlers for one endpoint.
#[derive(Clone, Default)]
pub struct HandlerBindings {
    pub(crate) open: Option<OpenHandler>,
    pub(crate) close: Option<CloseHandler>,
    pub(crate) error: Option<ErrorHandler>,
    pub(crate) text: Option<TextBinding>,
    pub(crate) binary: Option<BinaryBinding>,
    pub(crate) pong: Option<PongHandler>,
}

impl HandlerBindings {
    /// Start an empty set of bindings.
    #[must_use]
    pub fn builder() -> HandlerBindingsBuilder {
        HandlerBindingsBuilder::default()
    }

    #[must_use]
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    #[must_use]
    pub fn has_binary(&self) -> bool {
        self.binary.is_some()
    }
}

impl fmt::Debug for HandlerBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBindings")
            .field("open", &self.open.is_some())
            .field("close", &self.close.is_some())
            .field("error", &self.error.is_some())
            .field("text", &self.text.is_some())
            .field("binary", &self.binary.is_some())
            .field("pong", &self.pong.is_some())
            .finish()
    }
}

/// Builder for [`HandlerBindings`].
///
/// Registering a handler twice keeps the last one. A text or binary handler
/// replaces any earlier one of the same message type, whole or partial.
#[derive(Default)]
pub struct HandlerBindingsBuilder {
    bindings: HandlerBindings,
}

impl HandlerBindingsBuilder {
    #[must_use]
    pub fn on_open<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session) -> HandlerResult + Send + Sync + 'static,
    {
        self.bindings.open = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session, CloseCode, &str) -> HandlerResult + Send + Sync + 'static,
    {
        self.bindings.close = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<&Session>, &Error) -> HandlerResult + Send + Sync + 'static,
    {
        self.bindings.error = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session, String) -> HandlerResult + Send + Sync + 'static,
    {
        self.bindings.text = Some(TextBinding::whole(f));
        self
    }

    #[must_use]
    pub fn on_partial_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session, String, bool) -> HandlerResult + Send + Sync + 'static,
    {
        self.bindings.text = Some(TextBinding::partial(f));
        self
    }

    #[must_use]
    pub fn on_binary<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session, Bytes) -> HandlerResult + Send + Sync + 'static,
    {
        self.bindings.binary = Some(BinaryBinding::whole(f));
        self
    }

    #[must_use]
    pub fn on_partial_binary<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session, Bytes, bool) -> HandlerResult + Send + Sync + 'static,
    {
        self.bindings.binary = Some(BinaryBinding::partial(f));
        self
    }

    #[must_use]
    pub fn on_pong<F>(mut self, f: F) -> Self
    where
        F: Fn(&Session, Bytes) -> HandlerResult + Send + Sync + 'static,
    {
        self.bindings.pong = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn build(self) -> HandlerBindings {
        self.bindings
    }
}
