//! Per-connection session handed to endpoint bindings.
//!
//! A [`Session`] is created once, when the endpoint opens, and is the only
//! way bindings send frames or read the handshake metadata. The ready signal
//! callers await for connection establishment lives in [`ready`].

mod channel;
pub mod ready;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

#[cfg(feature = "async-tokio")]
pub use channel::MpscChannel;
pub use channel::Channel;
pub use ready::SessionFuture;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::close::MAX_CLOSE_REASON;
use crate::protocol::{
    CloseCode, Frame, HandshakeMetadata, HandshakeRequest, HandshakeResponse,
    MAX_CONTROL_FRAME_PAYLOAD,
};

/// Context shared by all bindings of one connection.
pub struct Session {
    id: String,
    endpoint: String,
    channel: Arc<dyn Channel>,
    handshake: Arc<HandshakeMetadata>,
    config: Config,
}

impl Session {
    /// Create a session over `channel`.
    pub fn new(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        channel: Arc<dyn Channel>,
        handshake: Arc<HandshakeMetadata>,
        config: Config,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint: endpoint.into(),
            channel,
            handshake,
            config,
        }
    }

    /// Connection id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Type name of the endpoint this session belongs to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn handshake_request(&self) -> &HandshakeRequest {
        &self.handshake.request
    }

    #[must_use]
    pub fn handshake_response(&self) -> &HandshakeResponse {
        &self.handshake.response
    }

    /// Subprotocol agreed during the handshake, if any.
    #[must_use]
    pub fn negotiated_subprotocol(&self) -> Option<&str> {
        self.handshake.response.protocol.as_deref()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the transport still accepts frames.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.channel.is_open()
    }

    /// Send a text message as a single frame.
    ///
    /// # Errors
    ///
    /// - `Error::MessageTooLarge` if the text exceeds `limits.max_message_size`
    /// - errors from the channel
    pub fn send_text(&self, text: &str) -> Result<()> {
        self.config.limits.check_message_size(text.len())?;
        self.channel
            .send_frame(Frame::text(Bytes::copy_from_slice(text.as_bytes())))
    }

    /// Send a binary message as a single frame.
    ///
    /// # Errors
    ///
    /// - `Error::MessageTooLarge` if the data exceeds `limits.max_message_size`
    /// - errors from the channel
    pub fn send_binary(&self, data: impl Into<Bytes>) -> Result<()> {
        let data = data.into();
        self.config.limits.check_message_size(data.len())?;
        self.channel.send_frame(Frame::binary(data))
    }

    /// Send a ping.
    ///
    /// # Errors
    ///
    /// - `Error::ControlFrameTooLarge` if the payload exceeds 125 bytes
    /// - errors from the channel
    pub fn send_ping(&self, data: impl Into<Bytes>) -> Result<()> {
        let data = control_payload(data.into())?;
        self.channel.send_frame(Frame::ping(data))
    }

    /// Send a pong.
    ///
    /// # Errors
    ///
    /// - `Error::ControlFrameTooLarge` if the payload exceeds 125 bytes
    /// - errors from the channel
    pub fn send_pong(&self, data: impl Into<Bytes>) -> Result<()> {
        let data = control_payload(data.into())?;
        self.channel.send_frame(Frame::pong(data))
    }

    /// Send a close frame.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidCloseCode` if `code` may not be sent
    /// - `Error::ControlFrameTooLarge` if the reason exceeds 123 bytes
    /// - errors from the channel
    pub fn close(&self, code: CloseCode, reason: &str) -> Result<()> {
        if code.is_reserved() || !code.is_valid() {
            return Err(Error::InvalidCloseCode(code.as_u16()));
        }
        if reason.len() > MAX_CLOSE_REASON {
            return Err(Error::ControlFrameTooLarge(reason.len() + 2));
        }
        self.channel
            .send_frame(Frame::close(Some(code.as_u16()), reason))
    }
}

fn control_payload(data: Bytes) -> Result<Bytes> {
    if data.len() > MAX_CONTROL_FRAME_PAYLOAD {
        return Err(Error::ControlFrameTooLarge(data.len()));
    }
    Ok(data)
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("path", &self.handshake.request.path)
            .finish_non_exhaustive()
    }
}
