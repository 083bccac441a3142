//! JPEG implementation of the [`FrameEncoder`] port.

use framecast_core::VariantImage;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::application::ports::{EncodeError, FrameEncoder};
use crate::domain::config::{MAX_QUALITY, MIN_QUALITY};

/// Baseline JPEG via the `image` crate.  Stateless; safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegFrameEncoder;

impl JpegFrameEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, image: &VariantImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(EncodeError::EmptyImage);
        }

        let color = match image {
            VariantImage::Color(_) => ExtendedColorType::Rgb8,
            VariantImage::Gray(_) => ExtendedColorType::L8,
        };
        let quality = quality.clamp(MIN_QUALITY, MAX_QUALITY);

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality)
            .encode(image.as_raw(), width, height, color)
            .map_err(|e| EncodeError::Codec(e.to_string()))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    const SOI: [u8; 2] = [0xFF, 0xD8];
    const EOI: [u8; 2] = [0xFF, 0xD9];

    fn noisy_color(w: u32, h: u32) -> VariantImage {
        VariantImage::Color(RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        }))
    }

    #[test]
    fn test_color_encodes_to_jpeg() {
        let bytes = JpegFrameEncoder::new().encode(&noisy_color(32, 24), 80).unwrap();
        assert_eq!(bytes[..2], SOI);
        assert_eq!(bytes[bytes.len() - 2..], EOI);
    }

    #[test]
    fn test_gray_encodes_to_jpeg() {
        let gray = VariantImage::Gray(GrayImage::from_pixel(16, 16, Luma([128])));
        let bytes = JpegFrameEncoder::new().encode(&gray, 80).unwrap();
        assert_eq!(bytes[..2], SOI);
    }

    #[test]
    fn test_output_decodes_to_same_dimensions() {
        let bytes = JpegFrameEncoder::new().encode(&noisy_color(40, 30), 90).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let image = noisy_color(64, 64);
        let encoder = JpegFrameEncoder::new();
        let low = encoder.encode(&image, 10).unwrap();
        let high = encoder.encode(&image, 100).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_out_of_range_quality_is_clamped() {
        let encoder = JpegFrameEncoder::new();
        assert!(encoder.encode(&noisy_color(8, 8), 0).is_ok());
        assert!(encoder.encode(&noisy_color(8, 8), 255).is_ok());
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let empty = VariantImage::Color(RgbImage::new(0, 0));
        assert_eq!(
            JpegFrameEncoder::new().encode(&empty, 80),
            Err(EncodeError::EmptyImage)
        );
    }
}
