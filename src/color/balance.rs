//! White-balance transforms
//!
//! Two statistics kernels drive all four named balance variants: white-patch
//! and perfect-reflector rescale each channel against its maximum, gray-world
//! and adaptive rescale against the grand mean of the channel means. Each
//! variant quantizes back to 8-bit before the next one runs, so the chain
//! compounds on already-cast data exactly like the reference pipeline.

use image::RgbImage;
use tracing::debug;

/// Damping applied to the green channel right after white-patch scaling.
pub(crate) const GREEN_DAMP: f32 = 0.85;
/// Damping applied to the blue channel right after white-patch scaling.
pub(crate) const BLUE_DAMP: f32 = 0.80;

/// No-op gain triple.
const NEUTRAL: [f32; 3] = [1.0, 1.0, 1.0];

/// Gains that damp green and blue after the white-patch max scaling.
pub(crate) const WHITE_PATCH_DAMP: [f32; 3] = [1.0, GREEN_DAMP, BLUE_DAMP];

/// Per-channel statistics over a full image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    /// Channel maxima in RGB order
    pub max: [u8; 3],
    /// Channel means in RGB order
    pub mean: [f64; 3],
}

/// Partial statistics over one interleaved RGB row
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RowStats {
    sum: [f64; 3],
    max: [u8; 3],
}

/// Accumulate sum and max for one interleaved RGB row.
#[inline]
pub(crate) fn row_stats(row: &[u8]) -> RowStats {
    let mut stats = RowStats::default();
    for px in row.chunks_exact(3) {
        for c in 0..3 {
            stats.sum[c] += f64::from(px[c]);
            stats.max[c] = stats.max[c].max(px[c]);
        }
    }
    stats
}

/// Fold per-row partials into whole-image statistics.
///
/// The fold is a sequential reduction in row order regardless of how the
/// partials were produced, so scalar and parallel execution paths arrive at
/// bit-identical means.
pub(crate) fn fold_row_stats<I>(rows: I, pixel_count: usize) -> ChannelStats
where
    I: IntoIterator<Item = RowStats>,
{
    let mut sum = [0.0f64; 3];
    let mut max = [0u8; 3];
    for row in rows {
        for c in 0..3 {
            sum[c] += row.sum[c];
            max[c] = max[c].max(row.max[c]);
        }
    }
    let mean = if pixel_count == 0 {
        [0.0; 3]
    } else {
        sum.map(|s| s / pixel_count as f64)
    };
    ChannelStats { max, mean }
}

/// Gains rescaling each channel so its maximum reaches 255.
///
/// A channel whose maximum is zero keeps a neutral gain instead of producing
/// an infinite scale; the degenerate channel is reported at debug level.
pub(crate) fn max_gains(stats: &ChannelStats) -> [f32; 3] {
    let mut gains = NEUTRAL;
    for c in 0..3 {
        if stats.max[c] == 0 {
            debug!(channel = c, "degenerate channel: max is zero, keeping neutral gain");
        } else {
            gains[c] = 255.0 / f32::from(stats.max[c]);
        }
    }
    gains
}

/// Gains rescaling each channel mean toward the grand mean of all three.
///
/// Same zero guard as [`max_gains`]: a channel with zero mean keeps a neutral
/// gain.
pub(crate) fn mean_gains(stats: &ChannelStats) -> [f32; 3] {
    let grand = (stats.mean[0] + stats.mean[1] + stats.mean[2]) / 3.0;
    let mut gains = NEUTRAL;
    for c in 0..3 {
        if stats.mean[c] == 0.0 {
            debug!(channel = c, "degenerate channel: mean is zero, keeping neutral gain");
        } else {
            gains[c] = (grand / stats.mean[c]) as f32;
        }
    }
    gains
}

/// Scale one interleaved RGB row by per-channel gains, clip, and cast.
///
/// The cast truncates toward zero, matching the reference pipeline's
/// clip-then-cast behavior.
#[inline]
pub(crate) fn scale_row(row: &mut [u8], gains: [f32; 3]) {
    for px in row.chunks_exact_mut(3) {
        for c in 0..3 {
            px[c] = (f32::from(px[c]) * gains[c]).clamp(0.0, 255.0) as u8;
        }
    }
}

fn channel_stats(image: &RgbImage) -> ChannelStats {
    let row_len = image.width() as usize * 3;
    let pixels = image.width() as usize * image.height() as usize;
    if row_len == 0 {
        return fold_row_stats(std::iter::empty(), 0);
    }
    fold_row_stats(image.as_raw().chunks_exact(row_len).map(row_stats), pixels)
}

fn apply_gains(image: &RgbImage, gains: [f32; 3]) -> RgbImage {
    let (width, height) = image.dimensions();
    let row_len = width as usize * 3;
    if row_len == 0 {
        return image.clone();
    }
    let mut buf = image.as_raw().clone();
    for row in buf.chunks_exact_mut(row_len) {
        scale_row(row, gains);
    }
    RgbImage::from_raw(width, height, buf).expect("buffer length matches dimensions")
}

/// White-patch balance: scale each channel by `255 / max`, then damp the
/// green and blue channels.
#[must_use]
pub fn white_patch(image: &RgbImage) -> RgbImage {
    let scaled = apply_gains(image, max_gains(&channel_stats(image)));
    apply_gains(&scaled, WHITE_PATCH_DAMP)
}

/// Gray-world balance: scale each channel mean toward the grand mean.
#[must_use]
pub fn gray_world(image: &RgbImage) -> RgbImage {
    apply_gains(image, mean_gains(&channel_stats(image)))
}

/// Perfect-reflector balance: max-based scaling without damping.
///
/// Shares the white-patch kernel but is kept as a separately named step
/// because the full chain applies max scaling a second time.
#[must_use]
pub fn perfect_reflector(image: &RgbImage) -> RgbImage {
    apply_gains(image, max_gains(&channel_stats(image)))
}

/// Adaptive balance: mean-based scaling, same kernel as gray-world.
#[must_use]
pub fn adaptive(image: &RgbImage) -> RgbImage {
    apply_gains(image, mean_gains(&channel_stats(image)))
}

/// The full white-balance chain in its fixed order:
/// white-patch -> gray-world -> perfect-reflector -> adaptive.
///
/// Each stage re-normalizes on top of the previous stage's already-quantized
/// output. The order is part of the output contract and must not change.
#[must_use]
pub fn apply_full_balance(image: &RgbImage) -> RgbImage {
    let image = white_patch(image);
    let image = gray_world(&image);
    let image = perfect_reflector(&image);
    adaptive(&image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn image_from_pixels(width: u32, height: u32, pixels: &[[u8; 3]]) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (i, px) in pixels.iter().enumerate() {
            let x = i as u32 % width;
            let y = i as u32 / width;
            img.put_pixel(x, y, Rgb(*px));
        }
        img
    }

    #[test]
    fn test_max_gains_guards_zero_channel() {
        let stats = ChannelStats {
            max: [200, 0, 100],
            mean: [50.0, 0.0, 25.0],
        };
        let gains = max_gains(&stats);
        assert!((gains[0] - 255.0 / 200.0).abs() < 1e-6);
        assert!((gains[1] - 1.0).abs() < f32::EPSILON);
        assert!((gains[2] - 255.0 / 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_black_channel_stays_black() {
        // Green channel is all zero: no NaN, no overflow, channel unchanged
        let img = image_from_pixels(2, 1, &[[100, 0, 40], [200, 0, 80]]);
        let balanced = perfect_reflector(&img);
        for px in balanced.pixels() {
            assert_eq!(px.0[1], 0);
        }
        // 255/80 is exactly representable, so the blue maximum lands on 255
        assert_eq!(balanced.get_pixel(1, 0).0[2], 255);
    }

    #[test]
    fn test_all_black_image_is_unchanged() {
        let img = RgbImage::new(3, 3);
        assert_eq!(perfect_reflector(&img).as_raw(), img.as_raw());
        assert_eq!(gray_world(&img).as_raw(), img.as_raw());
        assert_eq!(white_patch(&img).as_raw(), img.as_raw());
    }

    #[test]
    fn test_maxed_channel_is_stable_under_reapplication() {
        // Red already reaches 255, so its gain is exactly 1.0 on every pass
        let img = image_from_pixels(2, 1, &[[255, 40, 10], [30, 200, 90]]);
        let once = perfect_reflector(&img);
        let twice = perfect_reflector(&once);
        for (a, b) in once.pixels().zip(twice.pixels()) {
            assert_eq!(a.0[0], b.0[0]);
        }
    }

    #[test]
    fn test_white_patch_stable_on_maxed_undamped_channel() {
        // Red reaches 255 and is not damped, so re-applying white-patch
        // leaves it untouched
        let img = image_from_pixels(2, 1, &[[255, 40, 10], [30, 200, 90]]);
        let once = white_patch(&img);
        let twice = white_patch(&once);
        for (a, b) in once.pixels().zip(twice.pixels()) {
            assert_eq!(a.0[0], b.0[0]);
        }
    }

    #[test]
    fn test_white_patch_applies_damping() {
        // Single pixel at channel maxima: max scaling is identity, so the
        // output exposes the damping constants directly
        let img = image_from_pixels(1, 1, &[[255, 255, 255]]);
        let balanced = white_patch(&img);
        assert_eq!(balanced.get_pixel(0, 0).0, [255, 216, 204]);
    }

    #[test]
    fn test_perfect_reflector_has_no_damping() {
        let img = image_from_pixels(1, 1, &[[255, 255, 255]]);
        let balanced = perfect_reflector(&img);
        assert_eq!(balanced.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_gray_world_leaves_neutral_gray_unchanged() {
        let img = image_from_pixels(2, 2, &[[128; 3], [128; 3], [128; 3], [128; 3]]);
        assert_eq!(gray_world(&img).as_raw(), img.as_raw());
    }

    #[test]
    fn test_gray_world_balances_color_cast() {
        // Uniform cast: red mean 90, green 60, blue 30, grand mean 60
        let img = image_from_pixels(1, 1, &[[90, 60, 30]]);
        let balanced = gray_world(&img);
        assert_eq!(balanced.get_pixel(0, 0).0, [60, 60, 60]);
    }

    #[test]
    fn test_full_chain_matches_manual_sequence() {
        let img = image_from_pixels(
            2,
            2,
            &[[200, 30, 60], [10, 180, 90], [55, 55, 55], [240, 120, 5]],
        );
        let chained = apply_full_balance(&img);
        let manual = adaptive(&perfect_reflector(&gray_world(&white_patch(&img))));
        assert_eq!(chained.as_raw(), manual.as_raw());
    }

    #[test]
    fn test_fold_row_stats_empty_image() {
        let stats = fold_row_stats(std::iter::empty(), 0);
        assert_eq!(stats.max, [0, 0, 0]);
        assert_eq!(stats.mean, [0.0, 0.0, 0.0]);
    }
}
