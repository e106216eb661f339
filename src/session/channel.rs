//! Outbound transport handle.

use crate::error::Result;
use crate::protocol::Frame;

/// Opaque transport handle a session writes frames through.
///
/// `send_frame` must not block: implementations enqueue the frame and let
/// the transport flush it.
pub trait Channel: Send + Sync {
    /// Queue a frame for sending.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConnectionClosed` once the transport stopped accepting
    /// frames, or an I/O error from the underlying transport.
    fn send_frame(&self, frame: Frame) -> Result<()>;

    /// Whether the transport still accepts frames.
    fn is_open(&self) -> bool {
        true
    }
}

#[cfg(feature = "async-tokio")]
pub use mpsc::MpscChannel;

#[cfg(feature = "async-tokio")]
mod mpsc {
    use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

    use super::Channel;
    use crate::error::{Error, Result};
    use crate::protocol::Frame;

    /// A [`Channel`] feeding an unbounded tokio queue.
    ///
    /// The transport's writer task drains the receiver.
    #[derive(Debug, Clone)]
    pub struct MpscChannel {
        tx: UnboundedSender<Frame>,
    }

    impl MpscChannel {
        /// Create a channel and the receiver the writer task drains.
        #[must_use]
        pub fn new() -> (Self, UnboundedReceiver<Frame>) {
            let (tx, rx) = unbounded_channel();
            (Self { tx }, rx)
        }

        /// Wrap an existing sender.
        #[must_use]
        pub fn from_sender(tx: UnboundedSender<Frame>) -> Self {
            Self { tx }
        }
    }

    impl Channel for MpscChannel {
        fn send_frame(&self, frame: Frame) -> Result<()> {
            self.tx
                .send(frame)
                .map_err(|_| Error::ConnectionClosed(None))
        }

        fn is_open(&self) -> bool {
            !self.tx.is_closed()
        }
    }

}
