//! A single captured image.
//!
//! Capture sources hand the producer an RGB8 [`Frame`].  A frame with a zero
//! dimension is "empty": sources use it (or `None`) to signal that the device
//! produced nothing usable this time, and the producer skips it.

use image::imageops::{self, FilterType};
use image::RgbImage;
use thiserror::Error;

/// Errors raised by the frame constructors and transforms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The operation needs pixels but the frame has none.
    #[error("frame is empty")]
    EmptyFrame,

    /// A target dimension is zero.
    #[error("invalid target dimensions {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    /// A raw pixel buffer does not match `width * height * 3`.
    #[error("pixel buffer has {actual} bytes, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

/// A captured RGB8 image plus its capture timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
    captured_at_ms: u64,
}

impl Frame {
    /// Wraps an existing image buffer.
    pub fn new(image: RgbImage, captured_at_ms: u64) -> Self {
        Self {
            image,
            captured_at_ms,
        }
    }

    /// Builds a frame from tightly packed RGB8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::BufferSizeMismatch`] when `pixels.len()` is
    /// not `width * height * 3`.
    pub fn from_raw(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        captured_at_ms: u64,
    ) -> Result<Self, TransformError> {
        let expected = width as usize * height as usize * 3;
        let actual = pixels.len();
        let image = RgbImage::from_raw(width, height, pixels)
            .filter(|_| actual == expected)
            .ok_or(TransformError::BufferSizeMismatch { expected, actual })?;
        Ok(Self::new(image, captured_at_ms))
    }

    /// An empty frame, as produced by a device that delivered nothing.
    pub fn empty(captured_at_ms: u64) -> Self {
        Self::new(RgbImage::new(0, 0), captured_at_ms)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `true` when the frame has no pixels and must be skipped.
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Capture time in milliseconds since the Unix epoch.
    pub fn captured_at_ms(&self) -> u64 {
        self.captured_at_ms
    }

    /// Returns a copy scaled to exactly `width x height`.
    ///
    /// Uses bilinear filtering.  When the frame already has the target size
    /// the pixels are cloned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ZeroDimension`] for a zero target and
    /// [`TransformError::EmptyFrame`] when there is nothing to scale.
    pub fn resized(&self, width: u32, height: u32) -> Result<Frame, TransformError> {
        if width == 0 || height == 0 {
            return Err(TransformError::ZeroDimension { width, height });
        }
        if self.is_empty() {
            return Err(TransformError::EmptyFrame);
        }
        if self.width() == width && self.height() == height {
            return Ok(self.clone());
        }
        let image = imageops::resize(&self.image, width, height, FilterType::Triangle);
        Ok(Frame::new(image, self.captured_at_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, px: [u8; 3]) -> Frame {
        Frame::new(RgbImage::from_pixel(width, height, Rgb(px)), 7)
    }

    #[test]
    fn test_from_raw_accepts_exact_buffer() {
        let frame = Frame::from_raw(2, 2, vec![0; 12], 5).unwrap();
        assert_eq!((frame.width(), frame.height()), (2, 2));
        assert_eq!(frame.captured_at_ms(), 5);
    }

    #[test]
    fn test_from_raw_rejects_short_buffer() {
        let err = Frame::from_raw(2, 2, vec![0; 11], 0).unwrap_err();
        assert_eq!(
            err,
            TransformError::BufferSizeMismatch {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_from_raw_rejects_long_buffer() {
        let err = Frame::from_raw(1, 1, vec![0; 4], 0).unwrap_err();
        assert!(matches!(err, TransformError::BufferSizeMismatch { actual: 4, .. }));
    }

    #[test]
    fn test_empty_frame_is_empty() {
        assert!(Frame::empty(0).is_empty());
        assert!(!solid(1, 1, [0, 0, 0]).is_empty());
    }

    #[test]
    fn test_resize_changes_dimensions_and_keeps_timestamp() {
        let frame = solid(64, 48, [10, 20, 30]);
        let resized = frame.resized(32, 24).unwrap();
        assert_eq!((resized.width(), resized.height()), (32, 24));
        assert_eq!(resized.captured_at_ms(), 7);
        // A solid colour stays solid under bilinear filtering.
        assert_eq!(resized.image().get_pixel(5, 5), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_resize_to_same_size_is_identity() {
        let frame = solid(8, 8, [1, 2, 3]);
        assert_eq!(frame.resized(8, 8).unwrap(), frame);
    }

    #[test]
    fn test_resize_zero_target_is_error() {
        let frame = solid(8, 8, [0, 0, 0]);
        assert_eq!(
            frame.resized(0, 8),
            Err(TransformError::ZeroDimension { width: 0, height: 8 })
        );
    }

    #[test]
    fn test_resize_empty_frame_is_error() {
        assert_eq!(
            Frame::empty(0).resized(4, 4),
            Err(TransformError::EmptyFrame)
        );
    }
}
