//! Deterministic transforms from one captured frame to its broadcast variants.
//!
//! Each tick the producer resizes the captured frame to the output
//! dimensions and then derives one [`Variant`] per configured
//! [`PayloadKind`]:
//!
//! ```text
//! Frame (any size) ──resize──► Frame (output size) ──┬──► Variant { Color, RGB8 }
//!                                                    └──► Variant { Gray,  Luma8 }
//! ```
//!
//! Variants are independent: the encoder receives each one separately.

use image::imageops;
use image::{GrayImage, RgbImage};
use tracing::trace;

use crate::domain::frame::{Frame, TransformError};
use crate::protocol::kind::PayloadKind;

/// Pixel data of one derived variant.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantImage {
    /// 3 channels, 8 bits each.
    Color(RgbImage),
    /// 1 channel, 8 bits.
    Gray(GrayImage),
}

impl VariantImage {
    pub fn width(&self) -> u32 {
        match self {
            VariantImage::Color(img) => img.width(),
            VariantImage::Gray(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            VariantImage::Color(img) => img.height(),
            VariantImage::Gray(img) => img.height(),
        }
    }

    /// Number of interleaved channels per pixel.
    pub fn channels(&self) -> u8 {
        match self {
            VariantImage::Color(_) => 3,
            VariantImage::Gray(_) => 1,
        }
    }

    /// Tightly packed pixel bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            VariantImage::Color(img) => img.as_raw(),
            VariantImage::Gray(img) => img.as_raw(),
        }
    }
}

/// One named derivation of a captured frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub kind: PayloadKind,
    pub image: VariantImage,
}

/// Derives one variant per entry of `kinds`, in the given order.
///
/// Duplicate kinds produce duplicate variants; callers that need a set
/// should deduplicate first (see [`TransformPlan::new`]).
pub fn derive_variants(frame: &Frame, kinds: &[PayloadKind]) -> Vec<Variant> {
    kinds
        .iter()
        .map(|&kind| {
            let image = match kind {
                PayloadKind::Color => VariantImage::Color(frame.image().clone()),
                PayloadKind::Gray => VariantImage::Gray(imageops::grayscale(frame.image())),
            };
            Variant { kind, image }
        })
        .collect()
}

/// The fixed per-tick transform configuration: output size and variant set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformPlan {
    output_width: u32,
    output_height: u32,
    kinds: Vec<PayloadKind>,
}

impl TransformPlan {
    /// Builds a plan.  Duplicate kinds are dropped, keeping first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::ZeroDimension`] if either output dimension
    /// is zero.
    pub fn new(
        output_width: u32,
        output_height: u32,
        kinds: &[PayloadKind],
    ) -> Result<Self, TransformError> {
        if output_width == 0 || output_height == 0 {
            return Err(TransformError::ZeroDimension {
                width: output_width,
                height: output_height,
            });
        }
        let mut unique = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        Ok(Self {
            output_width,
            output_height,
            kinds: unique,
        })
    }

    pub fn output_size(&self) -> (u32, u32) {
        (self.output_width, self.output_height)
    }

    pub fn kinds(&self) -> &[PayloadKind] {
        &self.kinds
    }

    /// Resizes `frame` to the output size and derives every planned variant.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::EmptyFrame`] for a frame with no pixels.
    pub fn apply(&self, frame: &Frame) -> Result<Vec<Variant>, TransformError> {
        let scaled = frame.resized(self.output_width, self.output_height)?;
        trace!(
            from_w = frame.width(),
            from_h = frame.height(),
            to_w = self.output_width,
            to_h = self.output_height,
            variants = self.kinds.len(),
            "frame transformed"
        );
        Ok(derive_variants(&scaled, &self.kinds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn frame(width: u32, height: u32, px: [u8; 3]) -> Frame {
        Frame::new(RgbImage::from_pixel(width, height, Rgb(px)), 0)
    }

    #[test]
    fn test_derive_color_and_gray() {
        let variants = derive_variants(
            &frame(4, 2, [255, 255, 255]),
            &[PayloadKind::Color, PayloadKind::Gray],
        );
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].kind, PayloadKind::Color);
        assert_eq!(variants[0].image.channels(), 3);
        assert_eq!(variants[0].image.as_raw().len(), 4 * 2 * 3);
        assert_eq!(variants[1].kind, PayloadKind::Gray);
        assert_eq!(variants[1].image.channels(), 1);
        assert_eq!(variants[1].image.as_raw().len(), 4 * 2);
    }

    #[test]
    fn test_gray_of_white_is_white_and_black_is_black() {
        let white = derive_variants(&frame(1, 1, [255, 255, 255]), &[PayloadKind::Gray]);
        let black = derive_variants(&frame(1, 1, [0, 0, 0]), &[PayloadKind::Gray]);
        match (&white[0].image, &black[0].image) {
            (VariantImage::Gray(w), VariantImage::Gray(b)) => {
                assert_eq!(w.get_pixel(0, 0), &Luma([255]));
                assert_eq!(b.get_pixel(0, 0), &Luma([0]));
            }
            other => panic!("expected gray images, got {other:?}"),
        }
    }

    #[test]
    fn test_derive_respects_order() {
        let variants = derive_variants(
            &frame(1, 1, [0, 0, 0]),
            &[PayloadKind::Gray, PayloadKind::Color],
        );
        let kinds: Vec<_> = variants.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![PayloadKind::Gray, PayloadKind::Color]);
    }

    #[test]
    fn test_derive_with_no_kinds_is_empty() {
        assert!(derive_variants(&frame(1, 1, [0, 0, 0]), &[]).is_empty());
    }

    #[test]
    fn test_plan_deduplicates_kinds() {
        let plan = TransformPlan::new(
            8,
            8,
            &[PayloadKind::Color, PayloadKind::Color, PayloadKind::Gray],
        )
        .unwrap();
        assert_eq!(plan.kinds(), &[PayloadKind::Color, PayloadKind::Gray]);
    }

    #[test]
    fn test_plan_rejects_zero_output() {
        assert!(TransformPlan::new(0, 480, &[PayloadKind::Color]).is_err());
    }

    #[test]
    fn test_plan_apply_resizes_every_variant() {
        let plan = TransformPlan::new(16, 12, &PayloadKind::ALL).unwrap();
        let variants = plan.apply(&frame(64, 48, [1, 2, 3])).unwrap();
        assert_eq!(variants.len(), 2);
        for v in &variants {
            assert_eq!((v.image.width(), v.image.height()), (16, 12));
        }
    }

    #[test]
    fn test_plan_apply_empty_frame_is_error() {
        let plan = TransformPlan::new(16, 12, &PayloadKind::ALL).unwrap();
        assert_eq!(plan.apply(&Frame::empty(0)), Err(TransformError::EmptyFrame));
    }
}
