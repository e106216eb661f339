//! Configuration and limits for endpoint message delivery.

/// Limits applied by the message sinks while reassembling messages.
///
/// These limits bound the memory a single connection can hold for an
/// in-progress message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a complete message in bytes.
    ///
    /// Applies to whole-message sinks after all fragments are joined, and to
    /// outbound text/binary messages sent through a session.
    ///
    /// Default: 64 MB (64 * 1024 * 1024)
    pub max_message_size: usize,

    /// Maximum number of fragments in a single message.
    ///
    /// Default: 128
    pub max_fragment_count: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_size: 64 * 1024 * 1024, // 64 MB
            max_fragment_count: 128,
        }
    }
}

impl Limits {
    /// Create new limits with custom values.
    #[must_use]
    pub const fn new(max_message_size: usize, max_fragment_count: usize) -> Self {
        Self {
            max_message_size,
            max_fragment_count,
        }
    }

    /// Create limits suitable for small embedded systems.
    ///
    /// - Max message: 256 KB
    /// - Max fragments: 16
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            max_message_size: 256 * 1024,
            max_fragment_count: 16,
        }
    }

    /// Create limits for unrestricted use.
    ///
    /// Warning: Use only in trusted environments.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            max_message_size: usize::MAX,
            max_fragment_count: usize::MAX,
        }
    }

    /// Validate that message size is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`](crate::Error::MessageTooLarge) if `size` exceeds the configured maximum.
    pub const fn check_message_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_message_size {
            Err(crate::Error::MessageTooLarge {
                size,
                max: self.max_message_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate that fragment count is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyFragments`](crate::Error::TooManyFragments) if `count` exceeds the configured maximum.
    pub const fn check_fragment_count(&self, count: usize) -> Result<(), crate::Error> {
        if count > self.max_fragment_count {
            Err(crate::Error::TooManyFragments {
                count,
                max: self.max_fragment_count,
            })
        } else {
            Ok(())
        }
    }
}

/// Per-endpoint configuration handed to every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Resource limits.
    pub limits: Limits,

    /// Answer every PING with a PONG carrying the same payload.
    ///
    /// Turning this off leaves PING frames acknowledged but unanswered, for
    /// transports that reply to pings themselves.
    ///
    /// Default: true
    pub auto_pong: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            auto_pong: true,
        }
    }
}

impl Config {
    /// Create a new configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.limits.max_message_size = size;
        self
    }

    /// Set the maximum fragment count per message.
    #[must_use]
    pub const fn with_max_fragment_count(mut self, count: usize) -> Self {
        self.limits.max_fragment_count = count;
        self
    }

    /// Enable or disable automatic PONG replies.
    #[must_use]
    pub const fn with_auto_pong(mut self, enabled: bool) -> Self {
        self.auto_pong = enabled;
        self
    }
}
