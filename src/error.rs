//! Error types for endpoint frame dispatch.
//!
//! This module defines every error condition the dispatch layer can report,
//! from malformed control payloads to failures raised by user bindings.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Result type alias for endpoint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by user bindings.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared form of a binding failure, kept inside [`Error::HandlerInvocation`].
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// The endpoint event a failing binding was invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerPhase {
    Open,
    Close,
    Error,
    Text,
    Binary,
    Pong,
}

impl fmt::Display for HandlerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandlerPhase::Open => "OPEN",
            HandlerPhase::Close => "CLOSE",
            HandlerPhase::Error => "ERROR",
            HandlerPhase::Text => "TEXT",
            HandlerPhase::Binary => "BINARY",
            HandlerPhase::Pong => "PONG",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while dispatching frames to an endpoint.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Protocol violation detected (malformed close payload, bad close code).
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Invalid UTF-8 in a text message or close reason.
    #[error("Invalid UTF-8 in text payload")]
    InvalidUtf8,

    /// Invalid close code.
    #[error("Invalid close code: {0}")]
    InvalidCloseCode(u16),

    /// Reserved opcode used.
    #[error("Reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// Invalid opcode value.
    #[error("Invalid opcode: {0:#x}")]
    InvalidOpcode(u8),

    /// Control frame payload too large (>125 bytes).
    #[error("Control frame payload too large: {0} bytes (max: 125)")]
    ControlFrameTooLarge(usize),

    /// Message size exceeds configured maximum.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Too many fragments in a single message.
    #[error("Too many fragments: {count} (max: {max})")]
    TooManyFragments {
        /// Actual fragment count.
        count: usize,
        /// Maximum allowed fragments.
        max: usize,
    },

    /// Connection has been closed.
    #[error("Connection closed: {0:?}")]
    ConnectionClosed(Option<u16>),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A user binding failed while handling an endpoint event.
    ///
    /// When the failing binding was the error handler itself, the error it
    /// was handed is kept in `suppressed`.
    #[error("{endpoint} {phase} method error: {cause}")]
    HandlerInvocation {
        /// Type name of the endpoint whose binding failed.
        endpoint: String,
        /// Event the binding was invoked for.
        phase: HandlerPhase,
        /// Failure raised by the binding.
        #[source]
        cause: Cause,
        /// Original error suppressed by this failure, if any.
        suppressed: Option<Box<Error>>,
    },

    /// `on_open` was called on a handler that already opened its session.
    #[error("Session for {endpoint} already opened")]
    DoubleCompletion {
        /// Type name of the endpoint.
        endpoint: String,
    },

    /// A frame was dispatched before the session was opened.
    #[error("Session is not open")]
    NotOpen,
}

impl Error {
    /// Wrap a binding failure for `endpoint`.
    pub fn handler(endpoint: impl Into<String>, phase: HandlerPhase, cause: BoxError) -> Self {
        Error::HandlerInvocation {
            endpoint: endpoint.into(),
            phase,
            cause: Arc::from(cause),
            suppressed: None,
        }
    }

    /// Attach `original` as suppressed context to a handler invocation error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_suppressed(self, original: Error) -> Self {
        match self {
            Error::HandlerInvocation {
                endpoint,
                phase,
                cause,
                ..
            } => Error::HandlerInvocation {
                endpoint,
                phase,
                cause,
                suppressed: Some(Box::new(original)),
            },
            other => other,
        }
    }

    /// The suppressed original error, if this is a handler invocation error
    /// carrying one.
    #[must_use]
    pub fn suppressed(&self) -> Option<&Error> {
        match self {
            Error::HandlerInvocation { suppressed, .. } => suppressed.as_deref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8
    }
}
