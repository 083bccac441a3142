//! Capture sources.
//!
//! The device is named by a selector string from configuration:
//!
//! | Selector            | Source                                         |
//! |---------------------|------------------------------------------------|
//! | `synthetic`         | Moving test pattern at the configured size     |
//! | `synthetic:WxH`     | Moving test pattern at an explicit size        |
//!
//! Any other selector resolves to a source whose `open` fails, which the
//! producer reports once as a fatal start error.
//!
//! # Testability
//!
//! Tests script frames through [`mock::MockCaptureSource`].

pub mod mock;
pub mod synthetic;

use crate::application::ports::{CaptureError, CaptureSource};
use framecast_core::Frame;

pub use synthetic::SyntheticCapture;

/// Resolves a device selector into a capture source.
///
/// `default_size` is used by selectors that carry no explicit size.
pub fn from_selector(selector: &str, default_size: (u32, u32)) -> Box<dyn CaptureSource> {
    let trimmed = selector.trim();
    let (name, size) = match trimmed.split_once(':') {
        Some((name, size)) => (name, Some(size)),
        None => (trimmed, None),
    };

    if !name.eq_ignore_ascii_case("synthetic") {
        return Box::new(UnavailableCapture::new(
            trimmed,
            "no capture driver for this selector",
        ));
    }

    match size.map(parse_size) {
        None => Box::new(SyntheticCapture::new(default_size.0, default_size.1)),
        Some(Some((w, h))) => Box::new(SyntheticCapture::new(w, h)),
        Some(None) => Box::new(UnavailableCapture::new(
            trimmed,
            "expected a size of the form WIDTHxHEIGHT",
        )),
    }
}

/// Parses `"640x480"` into `(640, 480)`.  Zero dimensions are rejected.
fn parse_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

/// A source that can never be opened.
///
/// Stands in for selectors that name no known device, so the failure
/// surfaces through the same fatal-open path as a missing camera.
#[derive(Debug, Clone)]
pub struct UnavailableCapture {
    device: String,
    reason: String,
}

impl UnavailableCapture {
    pub fn new(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            reason: reason.into(),
        }
    }
}

impl CaptureSource for UnavailableCapture {
    fn open(&mut self) -> Result<(), CaptureError> {
        Err(CaptureError::DeviceUnavailable {
            device: self.device.clone(),
            reason: self.reason.clone(),
        })
    }

    fn grab(&mut self) -> Result<Option<Frame>, CaptureError> {
        Err(CaptureError::NotOpened)
    }

    fn describe(&self) -> String {
        self.device.clone()
    }
}
