//! Incremental UTF-8 decoding for partial text delivery.
//!
//! A text message split into fragments may cut a multi-byte code point in
//! half. The decoder hands out every complete code point as soon as it is
//! available and carries the incomplete tail over to the next fragment.

use crate::error::{Error, Result};

/// Incremental UTF-8 decoder for fragmented text messages.
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    /// Bytes of an incomplete code point left over from the last fragment.
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one fragment into the text it completes.
    ///
    /// For non-final fragments an incomplete code point at the end is kept
    /// back for the next call. For the final fragment every byte must belong
    /// to a complete code point, and the decoder is reset afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` if the data contains invalid UTF-8
    /// sequences, or if the final fragment ends mid code point.
    pub fn decode(&mut self, data: &[u8], is_final: bool) -> Result<String> {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(data);

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                let utf8 = err.utf8_error();
                // error_len() is None only for a truncated sequence at the end
                if is_final || utf8.error_len().is_some() {
                    return Err(Error::InvalidUtf8);
                }
                let mut bytes = err.into_bytes();
                self.pending = bytes.split_off(utf8.valid_up_to());
                String::from_utf8(bytes).map_err(Error::from)
            }
        }
    }

    /// Discard any incomplete code point.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Check if there are pending incomplete bytes.
    #[must_use]
    pub fn has_incomplete(&self) -> bool {
        !self.pending.is_empty()
    }
}
