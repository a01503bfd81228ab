//! Transform execution backends
//!
//! Every numeric stage of the pipeline runs through a [`TransformBackend`].
//! Two strategies exist: sequential scalar execution and rayon row-parallel
//! execution. Both share the same per-pixel kernels and fold channel
//! statistics in the same order, so their outputs are bit-identical.
//!
//! Strategy selection happens exactly once, at processor construction; there
//! is no per-call fallback.

mod parallel;
mod scalar;

pub use parallel::ParallelBackend;
pub use scalar::ScalarBackend;

use crate::config::ExecutionMode;
use crate::error::Result;
use image::{GrayImage, RgbImage};
use std::sync::Arc;
use tracing::info;

/// Common interface over the pixel transform chain
pub trait TransformBackend: Send + Sync {
    /// Human-readable strategy name for logs and metadata
    fn name(&self) -> &'static str;

    /// Apply the full white-balance chain
    fn white_balance(&self, image: &RgbImage) -> RgbImage;

    /// Scale HSV saturation
    fn saturate(&self, image: &RgbImage, scale: f32) -> RgbImage;

    /// Scale brightness uniformly
    fn brighten(&self, image: &RgbImage, factor: f32) -> RgbImage;

    /// Boost shadow pixels below the value threshold
    fn brighten_shadows(&self, image: &RgbImage, threshold: u8, factor: f32) -> RgbImage;

    /// Blend the image onto an opaque white canvas by its alpha plane
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Processing` on dimension mismatch between
    /// image and alpha plane.
    fn composite_onto_white(&self, image: &RgbImage, alpha: &GrayImage) -> Result<RgbImage>;
}

/// Resolve the execution strategy for the given mode.
///
/// `Auto` probes available parallelism once and picks the parallel strategy
/// on multi-core hosts. The probe happens here, before any image is
/// processed, and the choice holds for the lifetime of the processor.
///
/// # Errors
///
/// Reserved for strategies that can fail to initialize; the built-in
/// strategies always construct.
pub fn select_backend(mode: ExecutionMode) -> Result<Arc<dyn TransformBackend>> {
    let backend: Arc<dyn TransformBackend> = match mode {
        ExecutionMode::Scalar => Arc::new(ScalarBackend::new()),
        ExecutionMode::Parallel => Arc::new(ParallelBackend::new()),
        ExecutionMode::Auto => {
            let threads =
                std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
            if threads > 1 {
                info!(threads, "auto-selected parallel transform backend");
                Arc::new(ParallelBackend::new())
            } else {
                info!("auto-selected scalar transform backend");
                Arc::new(ScalarBackend::new())
            }
        },
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Deterministic pseudo-random fill so both strategies see identical,
    /// non-trivial channel distributions.
    fn fixture_image(width: u32, height: u32) -> RgbImage {
        let mut state = 0x2545_f491u32;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };
        let mut img = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = next();
                img.put_pixel(
                    x,
                    y,
                    Rgb([(v & 0xff) as u8, (v >> 8 & 0xff) as u8, (v >> 16 & 0xff) as u8]),
                );
            }
        }
        img
    }

    fn fixture_alpha(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            image::Luma([((x * 37 + y * 91) % 256) as u8])
        })
    }

    #[test]
    fn test_select_backend_never_fails() {
        for mode in [
            ExecutionMode::Auto,
            ExecutionMode::Scalar,
            ExecutionMode::Parallel,
        ] {
            assert!(select_backend(mode).is_ok());
        }
    }

    #[test]
    fn test_explicit_modes_resolve_to_named_strategies() {
        assert_eq!(
            select_backend(ExecutionMode::Scalar).unwrap().name(),
            "scalar"
        );
        assert_eq!(
            select_backend(ExecutionMode::Parallel).unwrap().name(),
            "parallel"
        );
    }

    #[test]
    fn test_strategies_are_bit_identical() {
        let scalar = ScalarBackend::new();
        let parallel = ParallelBackend::new();
        let img = fixture_image(64, 33);
        let alpha = fixture_alpha(64, 33);

        let a = scalar.white_balance(&img);
        let b = parallel.white_balance(&img);
        assert_eq!(a.as_raw(), b.as_raw());

        let a = scalar.saturate(&img, 1.4);
        let b = parallel.saturate(&img, 1.4);
        assert_eq!(a.as_raw(), b.as_raw());

        let a = scalar.brighten(&img, 1.15);
        let b = parallel.brighten(&img, 1.15);
        assert_eq!(a.as_raw(), b.as_raw());

        let a = scalar.brighten_shadows(&img, 80, 1.2);
        let b = parallel.brighten_shadows(&img, 80, 1.2);
        assert_eq!(a.as_raw(), b.as_raw());

        let a = scalar.composite_onto_white(&img, &alpha).unwrap();
        let b = parallel.composite_onto_white(&img, &alpha).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
