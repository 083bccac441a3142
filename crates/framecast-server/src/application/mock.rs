//! In-memory [`FrameSink`] implementations for tests.
//!
//! Allows broadcaster, producer, and lifecycle tests to observe deliveries
//! without opening sockets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use framecast_core::WireFrame;

use super::ports::{FrameSink, SendError};

/// Records every frame it is asked to send.
#[derive(Default)]
pub struct RecordingSink {
    frames: Mutex<Vec<WireFrame>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far, in arrival order.
    pub fn frames(&self) -> Vec<WireFrame> {
        self.frames.lock().expect("lock poisoned").clone()
    }

    pub fn count(&self) -> usize {
        self.frames.lock().expect("lock poisoned").len()
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn send(&self, frame: &WireFrame) -> Result<(), SendError> {
        self.frames.lock().expect("lock poisoned").push(frame.clone());
        Ok(())
    }
}

/// Fails every send, counting the attempts.
#[derive(Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSink for FailingSink {
    async fn send(&self, _frame: &WireFrame) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SendError::Closed)
    }
}
