//! Traits the application layer needs from the outside world.
//!
//! - [`CaptureSource`]: the image-capture device driver.
//! - [`FrameEncoder`]: the compression codec, `encode(image, quality) -> bytes`.
//! - [`FrameSink`]: the send half of one viewer connection.
//!
//! Production implementations live in `infrastructure`; tests inject
//! [`crate::infrastructure::capture::mock::MockCaptureSource`] and the sinks
//! in [`crate::application::mock`].

use async_trait::async_trait;
use framecast_core::{Frame, VariantImage, WireFrame};
use thiserror::Error;

/// Error type for capture sources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The device cannot be opened; the stream never starts.
    #[error("capture device {device:?} is unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    /// `grab` was called before a successful `open`.
    #[error("capture device has not been opened")]
    NotOpened,

    /// A single read failed after the device was opened.
    #[error("capture read failed: {0}")]
    ReadFailed(String),
}

/// Error type for frame encoders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The image has a zero dimension.
    #[error("cannot encode an empty image")]
    EmptyImage,

    /// The codec rejected the input.
    #[error("codec error: {0}")]
    Codec(String),
}

/// Error type for delivery to one viewer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The peer has already gone away.
    #[error("connection closed")]
    Closed,

    /// The transport reported a write failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Produces captured frames.
///
/// `open` is called exactly once before the first `grab`.  A failing `open`
/// is fatal for the producer.  `grab` returns `Ok(None)` (or an empty
/// [`Frame`]) when the device delivered nothing usable this time.
pub trait CaptureSource: Send {
    /// Opens the underlying device.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Reads the next frame.
    fn grab(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Human-readable device description for logs.
    fn describe(&self) -> String;
}

/// Compresses one variant image at the given quality (1–100).
#[cfg_attr(test, mockall::automock)]
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, image: &VariantImage, quality: u8) -> Result<Vec<u8>, EncodeError>;
}

/// Send half of a single viewer connection.
///
/// Implementations deliver the frame as one transport message: binary frames
/// as binary messages, text frames as text messages.  There is no queueing
/// and no retry behind this call.
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn send(&self, frame: &WireFrame) -> Result<(), SendError>;
}
