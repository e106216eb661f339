//! Shared fixtures for the dispatch integration tests.
//!
//! A recording transport, a recorder for frame acknowledgments and a few
//! ready-made handlers.
#![allow(dead_code)]

mod acks;
mod channel;

pub use acks::Acks;
pub use channel::RecordingChannel;

use std::sync::Arc;

use rsws_endpoint::{FrameHandler, HandlerBindings, HandshakeMetadata, HandshakeRequest, HandshakeResponse};

/// Endpoint type used by every test handler.
pub struct ChatEndpoint;

pub fn handshake() -> HandshakeMetadata {
    HandshakeMetadata::new(
        HandshakeRequest::new("/chat", "localhost:9001")
            .with_origin("http://localhost")
            .with_protocol("chat.v1")
            .with_query("room", "lobby"),
        HandshakeResponse::new().with_protocol("chat.v1"),
    )
}

pub fn handler(bindings: HandlerBindings) -> FrameHandler<ChatEndpoint> {
    FrameHandler::new(Arc::new(ChatEndpoint), bindings, handshake(), "conn-1")
}

/// A handler already opened on a fresh [`RecordingChannel`].
pub fn open(bindings: HandlerBindings) -> (FrameHandler<ChatEndpoint>, Arc<RecordingChannel>) {
    let channel = Arc::new(RecordingChannel::new());
    let mut handler = handler(bindings);
    handler.on_open(channel.clone()).unwrap();
    (handler, channel)
}

/// Route library logs to the test output. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
