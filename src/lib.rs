//! # rsws-endpoint - Per-connection WebSocket frame dispatch
//!
//! `rsws-endpoint` sits between a WebSocket framing engine and application
//! handlers. It takes already parsed and unmasked frames, reassembles
//! fragmented messages, drives the endpoint lifecycle and tells callers when
//! the connection is ready.
//!
//! ## Features
//!
//! - **Opcode dispatch** with automatic PONG replies and close status parsing
//! - **Whole or partial delivery** of text and binary messages
//! - **Exactly-once acknowledgment** of every frame through [`Callback`]
//! - **One-shot ready signal** ([`SessionFuture`]) settled by open or error
//! - **Resource limits** on reassembled message size and fragment count
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rsws_endpoint::{Callback, FrameHandler, HandlerBindings, MpscChannel};
//!
//! let bindings = HandlerBindings::builder()
//!     .on_text(|session, text| Ok(session.send_text(&text)?))
//!     .build();
//!
//! let (channel, outbound) = MpscChannel::new();
//! let mut handler = FrameHandler::new(Arc::new(Echo), bindings, handshake, "conn-1");
//! handler.on_open(Arc::new(channel))?;
//! handler.on_frame(frame, Callback::noop())?;
//! ```

pub mod callback;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod protocol;
pub mod session;
pub mod sink;

pub use callback::Callback;
pub use config::{Config, Limits};
pub use endpoint::{
    BinaryBinding, FrameHandler, HandlerBindings, HandlerBindingsBuilder, HandlerResult,
    LifecycleState, SinkManager, TextBinding,
};
pub use error::{BoxError, Error, HandlerPhase, Result};
pub use protocol::{
    CloseCode, CloseStatus, Frame, HandshakeMetadata, HandshakeRequest, HandshakeResponse, OpCode,
};
#[cfg(feature = "async-tokio")]
pub use session::MpscChannel;
pub use session::{Channel, Session, SessionFuture};
pub use sink::{MessageSink, SinkKind};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_public_types_are_send() {
        assert_send::<Error>();
        assert_send::<Config>();
        assert_send::<Limits>();
        assert_send::<Frame>();
        assert_send::<CloseStatus>();
        assert_send::<Callback>();
        assert_send::<Session>();
        assert_send::<SessionFuture>();
        assert_send::<HandlerBindings>();
        assert_send::<FrameHandler<()>>();
    }

    #[test]
    fn test_public_types_are_sync() {
        assert_sync::<Error>();
        assert_sync::<Config>();
        assert_sync::<Limits>();
        assert_sync::<Frame>();
        assert_sync::<CloseStatus>();
        assert_sync::<Session>();
        assert_sync::<SessionFuture>();
        assert_sync::<HandlerBindings>();
        assert_sync::<LifecycleState>();
    }
}
