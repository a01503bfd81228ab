//! Row-parallel transform execution on the rayon thread pool

use super::TransformBackend;
use crate::color::balance::{self, ChannelStats};
use crate::color::{self, adjust};
use crate::composite;
use crate::error::{PipelineError, Result};
use image::{GrayImage, RgbImage};
use rayon::prelude::*;

/// Executes the transform chain with rayon row-parallelism.
///
/// Per-pixel kernels are shared with [`super::ScalarBackend`], and channel
/// statistics are folded from per-row partials in row order, so results are
/// bit-identical to sequential execution.
#[derive(Debug, Default)]
pub struct ParallelBackend;

impl ParallelBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn stats(image: &RgbImage) -> ChannelStats {
        let row_len = image.width() as usize * 3;
        let pixels = image.width() as usize * image.height() as usize;
        if row_len == 0 {
            return balance::fold_row_stats(std::iter::empty(), 0);
        }
        let rows: Vec<_> = image
            .as_raw()
            .par_chunks_exact(row_len)
            .map(balance::row_stats)
            .collect();
        balance::fold_row_stats(rows, pixels)
    }

    fn apply_gains(image: &RgbImage, gains: [f32; 3]) -> RgbImage {
        let (width, height) = image.dimensions();
        let row_len = width as usize * 3;
        if row_len == 0 {
            return image.clone();
        }
        let mut buf = image.as_raw().clone();
        buf.par_chunks_exact_mut(row_len)
            .for_each(|row| balance::scale_row(row, gains));
        RgbImage::from_raw(width, height, buf).expect("buffer length matches dimensions")
    }

    fn map_pixels<F>(image: &RgbImage, kernel: F) -> RgbImage
    where
        F: Fn([u8; 3]) -> [u8; 3] + Sync,
    {
        let (width, height) = image.dimensions();
        let row_len = width as usize * 3;
        if row_len == 0 {
            return image.clone();
        }
        let mut buf = image.as_raw().clone();
        buf.par_chunks_exact_mut(row_len)
            .for_each(|row| color::map_row(row, &kernel));
        RgbImage::from_raw(width, height, buf).expect("buffer length matches dimensions")
    }
}

impl TransformBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn white_balance(&self, image: &RgbImage) -> RgbImage {
        // Same fixed order as the sequential chain: white-patch (damped),
        // gray-world, perfect-reflector, adaptive.
        let scaled = Self::apply_gains(image, balance::max_gains(&Self::stats(image)));
        let white_patched = Self::apply_gains(&scaled, balance::WHITE_PATCH_DAMP);
        let gray_world =
            Self::apply_gains(&white_patched, balance::mean_gains(&Self::stats(&white_patched)));
        let reflector =
            Self::apply_gains(&gray_world, balance::max_gains(&Self::stats(&gray_world)));
        Self::apply_gains(&reflector, balance::mean_gains(&Self::stats(&reflector)))
    }

    fn saturate(&self, image: &RgbImage, scale: f32) -> RgbImage {
        Self::map_pixels(image, |px| adjust::saturate_pixel(px, scale))
    }

    fn brighten(&self, image: &RgbImage, factor: f32) -> RgbImage {
        Self::map_pixels(image, |px| adjust::brighten_pixel(px, factor))
    }

    fn brighten_shadows(&self, image: &RgbImage, threshold: u8, factor: f32) -> RgbImage {
        Self::map_pixels(image, |px| adjust::shadow_pixel(px, threshold, factor))
    }

    fn composite_onto_white(&self, image: &RgbImage, alpha: &GrayImage) -> Result<RgbImage> {
        if image.dimensions() != alpha.dimensions() {
            return Err(PipelineError::processing(format!(
                "alpha plane {}x{} does not match image {}x{}",
                alpha.width(),
                alpha.height(),
                image.width(),
                image.height()
            )));
        }

        let (width, height) = image.dimensions();
        let row_len = width as usize * 3;
        if row_len == 0 {
            return Ok(image.clone());
        }
        let mut buf = image.as_raw().clone();
        buf.par_chunks_exact_mut(row_len)
            .zip(alpha.as_raw().par_chunks_exact(width as usize))
            .for_each(|(rgb_row, alpha_row)| composite::blend_row(rgb_row, alpha_row));

        Ok(RgbImage::from_raw(width, height, buf).expect("buffer length matches dimensions"))
    }
}
