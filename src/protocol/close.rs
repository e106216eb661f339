//! Close status codes and the CLOSE payload parser (RFC 6455 Section 7.4).

use crate::error::{Error, Result};
use crate::protocol::frame::MAX_CONTROL_FRAME_PAYLOAD;

/// Longest close reason that fits in a control frame after the status code.
pub const MAX_CLOSE_REASON: usize = MAX_CONTROL_FRAME_PAYLOAD - 2;

/// WebSocket close status code per RFC 6455 Section 7.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CloseCode {
    /// Normal closure (1000).
    #[default]
    Normal,
    /// Going away (1001).
    GoingAway,
    /// Protocol error (1002).
    ProtocolError,
    /// Unsupported data (1003).
    UnsupportedData,
    /// No status code was present in the close frame (1005).
    ///
    /// Never sent on the wire; reported when a CLOSE frame has no payload.
    NoStatus,
    /// Connection dropped without a close frame (1006). Never sent on the wire.
    Abnormal,
    /// Invalid payload (1007).
    InvalidPayload,
    /// Policy violation (1008).
    PolicyViolation,
    /// Message too big (1009).
    MessageTooBig,
    /// Mandatory extension (1010).
    MandatoryExtension,
    /// Internal error (1011).
    InternalError,
    /// Any other code (1012-1014 registered, 3000-4999 applications).
    Other(u16),
}

impl CloseCode {
    /// Create a `CloseCode` from its numeric value.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        match code {
            1000 => CloseCode::Normal,
            1001 => CloseCode::GoingAway,
            1002 => CloseCode::ProtocolError,
            1003 => CloseCode::UnsupportedData,
            1005 => CloseCode::NoStatus,
            1006 => CloseCode::Abnormal,
            1007 => CloseCode::InvalidPayload,
            1008 => CloseCode::PolicyViolation,
            1009 => CloseCode::MessageTooBig,
            1010 => CloseCode::MandatoryExtension,
            1011 => CloseCode::InternalError,
            other => CloseCode::Other(other),
        }
    }

    /// Get the numeric value of this close code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        match self {
            CloseCode::Normal => 1000,
            CloseCode::GoingAway => 1001,
            CloseCode::ProtocolError => 1002,
            CloseCode::UnsupportedData => 1003,
            CloseCode::NoStatus => 1005,
            CloseCode::Abnormal => 1006,
            CloseCode::InvalidPayload => 1007,
            CloseCode::PolicyViolation => 1008,
            CloseCode::MessageTooBig => 1009,
            CloseCode::MandatoryExtension => 1010,
            CloseCode::InternalError => 1011,
            CloseCode::Other(code) => *code,
        }
    }

    /// Check if this code may appear in a close frame.
    ///
    /// Valid: 1000-1003, 1007-1014, 3000-4999.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.as_u16(), 1000..=1003 | 1007..=1014 | 3000..=4999)
    }

    /// Check if this code is reserved and MUST NOT be sent in a close frame.
    ///
    /// Reserved: 1004, 1005, 1006, 1015.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(self.as_u16(), 1004..=1006 | 1015)
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Structured status carried by a CLOSE frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseStatus {
    /// The close status code.
    pub code: CloseCode,
    /// Human-readable reason for closing (UTF-8, max 123 bytes).
    pub reason: String,
}

impl CloseStatus {
    /// Create a new close status with the given code and reason.
    #[must_use]
    pub fn new(code: CloseCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Status reported for a CLOSE frame without a payload.
    #[must_use]
    pub fn no_status() -> Self {
        Self::new(CloseCode::NoStatus, "")
    }

    /// Parse the payload of a received CLOSE frame.
    ///
    /// An absent or empty payload yields [`CloseCode::NoStatus`].
    ///
    /// # Errors
    ///
    /// - `Error::ProtocolViolation` for a one-byte payload, a code that may
    ///   not appear on the wire, or a reason longer than 123 bytes
    /// - `Error::InvalidUtf8` if the reason is not valid UTF-8
    pub fn from_payload(payload: Option<&[u8]>) -> Result<Self> {
        let payload = match payload {
            None | Some([]) => return Ok(Self::no_status()),
            Some(payload) => payload,
        };

        let [hi, lo, reason @ ..] = payload else {
            return Err(Error::ProtocolViolation(format!(
                "Invalid close payload length: {}",
                payload.len()
            )));
        };

        let code = CloseCode::from_u16(u16::from_be_bytes([*hi, *lo]));
        if !code.is_valid() {
            return Err(Error::ProtocolViolation(format!(
                "Invalid close code: {code}"
            )));
        }

        if reason.len() > MAX_CLOSE_REASON {
            return Err(Error::ProtocolViolation(format!(
                "Close reason too long: {} bytes (max: {MAX_CLOSE_REASON})",
                reason.len()
            )));
        }

        let reason = std::str::from_utf8(reason)?;
        Ok(Self::new(code, reason))
    }

    /// Encode this status as a CLOSE payload.
    ///
    /// [`CloseCode::NoStatus`] encodes as an empty payload.
    #[must_use]
    pub fn to_payload(&self) -> Vec<u8> {
        if self.code == CloseCode::NoStatus {
            return Vec::new();
        }
        let mut data = self.code.as_u16().to_be_bytes().to_vec();
        data.extend_from_slice(self.reason.as_bytes());
        data
    }
}
