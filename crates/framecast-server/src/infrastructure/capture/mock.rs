//! Mock capture source for unit and integration testing.
//!
//! Allows tests to script exactly what each grab returns, or to simulate a
//! device that cannot be opened, without any hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use framecast_core::Frame;

use crate::application::ports::{CaptureError, CaptureSource};

/// One scripted grab result.
#[derive(Debug, Clone)]
pub enum MockGrab {
    /// Deliver this frame.
    Frame(Frame),
    /// Deliver nothing (`Ok(None)`).
    Empty,
    /// Fail the read with this message.
    Error(String),
}

/// Shared call counters, readable after the source has been moved into a
/// producer.
#[derive(Debug, Clone, Default)]
pub struct CaptureProbe {
    open_calls: Arc<AtomicUsize>,
    grab_calls: Arc<AtomicUsize>,
}

impl CaptureProbe {
    pub fn open_calls(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    pub fn grab_calls(&self) -> usize {
        self.grab_calls.load(Ordering::SeqCst)
    }
}

/// A scripted implementation of [`CaptureSource`].
///
/// Once the script is exhausted, every grab returns `Ok(None)` unless a
/// repeating frame was configured.
pub struct MockCaptureSource {
    script: VecDeque<MockGrab>,
    repeat: Option<Frame>,
    open_error: Option<String>,
    probe: CaptureProbe,
}

impl MockCaptureSource {
    /// Creates a source that plays `script` in order.
    pub fn new(script: Vec<MockGrab>) -> Self {
        Self {
            script: script.into(),
            repeat: None,
            open_error: None,
            probe: CaptureProbe::default(),
        }
    }

    /// Creates a source that returns a copy of `frame` on every grab.
    pub fn repeating(frame: Frame) -> Self {
        Self {
            repeat: Some(frame),
            ..Self::new(Vec::new())
        }
    }

    /// Creates a source whose `open` always fails with `reason`.
    pub fn failing_open(reason: impl Into<String>) -> Self {
        Self {
            open_error: Some(reason.into()),
            ..Self::new(Vec::new())
        }
    }

    /// Returns a handle to this source's call counters.
    pub fn probe(&self) -> CaptureProbe {
        self.probe.clone()
    }
}

impl CaptureSource for MockCaptureSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        self.probe.open_calls.fetch_add(1, Ordering::SeqCst);
        match &self.open_error {
            Some(reason) => Err(CaptureError::DeviceUnavailable {
                device: self.describe(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn grab(&mut self) -> Result<Option<Frame>, CaptureError> {
        self.probe.grab_calls.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            Some(MockGrab::Frame(frame)) => Ok(Some(frame)),
            Some(MockGrab::Empty) => Ok(None),
            Some(MockGrab::Error(msg)) => Err(CaptureError::ReadFailed(msg)),
            None => Ok(self.repeat.clone()),
        }
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
