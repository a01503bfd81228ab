//! Sequential transform execution

use super::TransformBackend;
use crate::color;
use crate::composite;
use crate::error::Result;
use image::{GrayImage, RgbImage};

/// Executes the transform chain sequentially on the calling thread.
///
/// This is the reference strategy: the parallel backend is defined to be
/// bit-identical to it.
#[derive(Debug, Default)]
pub struct ScalarBackend;

impl ScalarBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TransformBackend for ScalarBackend {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn white_balance(&self, image: &RgbImage) -> RgbImage {
        color::apply_full_balance(image)
    }

    fn saturate(&self, image: &RgbImage, scale: f32) -> RgbImage {
        color::increase_saturation(image, scale)
    }

    fn brighten(&self, image: &RgbImage, factor: f32) -> RgbImage {
        color::adjust_brightness(image, factor)
    }

    fn brighten_shadows(&self, image: &RgbImage, threshold: u8, factor: f32) -> RgbImage {
        color::brighten_shadows(image, threshold, factor)
    }

    fn composite_onto_white(&self, image: &RgbImage, alpha: &GrayImage) -> Result<RgbImage> {
        composite::composite_onto_white(image, alpha)
    }
}
