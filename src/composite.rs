//! Alpha-aware compositing onto an opaque white canvas

use crate::error::{PipelineError, Result};
use image::{GrayImage, RgbImage};

/// Blend one RGB pixel toward white by its alpha weight.
///
/// `alpha = 0` lands exactly on white, `alpha = 255` keeps the pixel as-is;
/// everything in between is a linear mix, so anti-aliased mask edges become
/// light gray instead of a hard cutout.
#[inline]
pub(crate) fn blend_pixel(px: [u8; 3], alpha: u8) -> [u8; 3] {
    let alpha_factor = f32::from(alpha) / 255.0;
    px.map(|c| {
        (alpha_factor * f32::from(c) + (1.0 - alpha_factor) * 255.0).clamp(0.0, 255.0) as u8
    })
}

/// Blend one interleaved RGB row against its alpha row in place.
#[inline]
pub(crate) fn blend_row(rgb_row: &mut [u8], alpha_row: &[u8]) {
    for (px, &alpha) in rgb_row.chunks_exact_mut(3).zip(alpha_row) {
        let out = blend_pixel([px[0], px[1], px[2]], alpha);
        px.copy_from_slice(&out);
    }
}

/// Composite an RGB image onto a solid white background using an alpha plane.
///
/// The output is a fully opaque 3-channel image ready for standard encoding.
///
/// # Errors
///
/// Returns `PipelineError::Processing` when the alpha plane's dimensions do
/// not match the image.
pub fn composite_onto_white(image: &RgbImage, alpha: &GrayImage) -> Result<RgbImage> {
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
    for (rgb_row, alpha_row) in buf
        .chunks_exact_mut(row_len)
        .zip(alpha.as_raw().chunks_exact(width as usize))
    {
        blend_row(rgb_row, alpha_row);
    }

    Ok(RgbImage::from_raw(width, height, buf).expect("buffer length matches dimensions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_zero_alpha_is_pure_white() {
        assert_eq!(blend_pixel([10, 200, 77], 0), [255, 255, 255]);
    }

    #[test]
    fn test_full_alpha_keeps_pixel() {
        assert_eq!(blend_pixel([10, 200, 77], 255), [10, 200, 77]);
        assert_eq!(blend_pixel([0, 0, 0], 255), [0, 0, 0]);
    }

    #[test]
    fn test_half_alpha_blends_toward_white() {
        // 128/255 * 0 + 127/255 * 255 = 127
        let blended = blend_pixel([0, 0, 0], 128);
        for c in blended {
            assert_eq!(c, 127);
        }
    }

    #[test]
    fn test_composite_mixed_mask() {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, Rgb([40, 80, 120]));
        rgb.put_pixel(1, 0, Rgb([200, 10, 30]));
        let mut alpha = GrayImage::new(2, 1);
        alpha.put_pixel(0, 0, Luma([255]));
        alpha.put_pixel(1, 0, Luma([0]));

        let out = composite_onto_white(&rgb, &alpha).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [40, 80, 120]);
        assert_eq!(out.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let rgb = RgbImage::new(2, 2);
        let alpha = GrayImage::new(3, 2);
        let err = composite_onto_white(&rgb, &alpha).unwrap_err();
        assert!(matches!(err, PipelineError::Processing(_)));
    }
}
