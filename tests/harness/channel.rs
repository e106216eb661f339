//! Transport stand-in that records outbound frames.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use rsws_endpoint::{Channel, Error, Frame, Result};

pub struct RecordingChannel {
    sent: Mutex<Vec<Frame>>,
    open: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            open: AtomicBool::new(true),
        }
    }

    /// Frames written so far.
    pub fn sent(&self) -> Vec<Frame> {
        self.sent.lock().unwrap().clone()
    }

    /// Refuse all further writes.
    pub fn shut(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

impl Channel for RecordingChannel {
    fn send_frame(&self, frame: Frame) -> Result<()> {
        if !self.is_open() {
            return Err(Error::ConnectionClosed(None));
        }
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
