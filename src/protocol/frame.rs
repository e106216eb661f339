//! Parsed, unmasked frames as handed over by the framing layer.

use bytes::Bytes;

use crate::protocol::OpCode;

/// Maximum payload size for control frames (RFC 6455).
pub const MAX_CONTROL_FRAME_PAYLOAD: usize = 125;

/// A single WebSocket frame after parsing and unmasking.
///
/// The payload is optional: a frame whose payload length was zero on the
/// wire may arrive either with an empty buffer or with none at all, and
/// dispatch treats both the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame opcode defining the interpretation of payload data.
    pub opcode: OpCode,
    /// Final fragment flag. True if this is the last fragment of a message.
    pub fin: bool,
    payload: Option<Bytes>,
}

impl Frame {
    /// Create a new frame with the given parameters.
    #[must_use]
    pub fn new(fin: bool, opcode: OpCode, payload: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            fin,
            payload: Some(payload.into()),
        }
    }

    /// Create a frame that carries no payload buffer at all.
    #[must_use]
    pub const fn without_payload(fin: bool, opcode: OpCode) -> Self {
        Self {
            opcode,
            fin,
            payload: None,
        }
    }

    /// Create a final text frame.
    #[must_use]
    pub fn text(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Text, data)
    }

    /// Create a final binary frame.
    #[must_use]
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Binary, data)
    }

    /// Create a continuation frame.
    #[must_use]
    pub fn continuation(fin: bool, data: impl Into<Bytes>) -> Self {
        Self::new(fin, OpCode::Continuation, data)
    }

    /// Create a close frame with optional status code and reason.
    #[must_use]
    pub fn close(code: Option<u16>, reason: &str) -> Self {
        let payload = match code {
            Some(code) => {
                let mut data = code.to_be_bytes().to_vec();
                data.extend_from_slice(reason.as_bytes());
                data
            }
            None => Vec::new(),
        };
        Self::new(true, OpCode::Close, payload)
    }

    /// Create a ping frame.
    #[must_use]
    pub fn ping(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Ping, data)
    }

    /// Create a pong frame.
    #[must_use]
    pub fn pong(data: impl Into<Bytes>) -> Self {
        Self::new(true, OpCode::Pong, data)
    }

    /// Whether the frame carries a non-empty payload.
    #[inline]
    #[must_use]
    pub fn has_payload(&self) -> bool {
        self.payload.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Payload length in bytes; zero when absent.
    #[inline]
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, Bytes::len)
    }

    /// Get the payload bytes, empty when the frame carries none.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or_default()
    }

    /// The raw payload buffer, `None` when the frame carries none.
    #[inline]
    #[must_use]
    pub fn payload_bytes(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Take ownership of the payload, empty when absent.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_payload_reads_as_empty() {
        let frame = Frame::without_payload(true, OpCode::Ping);
        assert!(!frame.has_payload());
        assert_eq!(frame.payload_len(), 0);
        assert!(frame.payload().is_empty());
        assert!(frame.payload_bytes().is_none());
        assert!(frame.into_payload().is_empty());
    }

    #[test]
    fn test_empty_payload_is_not_absent() {
        let frame = Frame::ping(Vec::new());
        assert!(!frame.has_payload());
        assert!(frame.payload_bytes().is_some());
    }

    #[test]
    fn test_close_frame_payload() {
        let frame = Frame::close(Some(1000), "bye");
        assert_eq!(frame.opcode, OpCode::Close);
        assert!(frame.fin);
        assert_eq!(frame.payload(), &[0x03, 0xe8, b'b', b'y', b'e']);

        let empty = Frame::close(None, "ignored");
        assert_eq!(empty.payload_len(), 0);
    }

    #[test]
    fn test_constructors_set_opcode_and_fin() {
        assert_eq!(Frame::text("a").opcode, OpCode::Text);
        assert_eq!(Frame::binary(vec![1]).opcode, OpCode::Binary);
        assert_eq!(Frame::pong("p").opcode, OpCode::Pong);

        let cont = Frame::continuation(false, "x");
        assert_eq!(cont.opcode, OpCode::Continuation);
        assert!(!cont.fin);
    }
}
