//! Synthetic capture source: a moving colour gradient.
//!
//! Needs no hardware, so the server streams something useful on any host.
//! Each grab shifts the pattern by a few pixels, which makes dropped or
//! reordered frames easy to spot in a viewer.

use framecast_core::{epoch_millis, Frame};
use image::{Rgb, RgbImage};

use crate::application::ports::{CaptureError, CaptureSource};

const STEP_PX: u32 = 4;

#[derive(Debug, Clone)]
pub struct SyntheticCapture {
    width: u32,
    height: u32,
    opened: bool,
    phase: u32,
}

impl SyntheticCapture {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            opened: false,
            phase: 0,
        }
    }

    fn render(&self) -> RgbImage {
        let (w, h, phase) = (self.width, self.height, self.phase);
        RgbImage::from_fn(w, h, |x, y| {
            let sx = (x + phase) % w;
            let r = (sx * 255 / w.max(1)) as u8;
            let g = (y * 255 / h.max(1)) as u8;
            let b = ((sx + y) % 256) as u8;
            Rgb([r, g, b])
        })
    }
}

impl CaptureSource for SyntheticCapture {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::DeviceUnavailable {
                device: self.describe(),
                reason: "zero-sized pattern".to_string(),
            });
        }
        self.opened = true;
        Ok(())
    }

    fn grab(&mut self) -> Result<Option<Frame>, CaptureError> {
        if !self.opened {
            return Err(CaptureError::NotOpened);
        }
        let image = self.render();
        self.phase = (self.phase + STEP_PX) % self.width;
        Ok(Some(Frame::new(image, epoch_millis())))
    }

    fn describe(&self) -> String {
        format!("synthetic:{}x{}", self.width, self.height)
    }
}
