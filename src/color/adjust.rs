//! Saturation, brightness, and shadow adjustments

use super::hsv::{hsv_to_rgb, rgb_to_hsv, Hsv};
use super::map_row;
use image::RgbImage;

/// Scale the HSV saturation of one pixel, clipping to the valid range.
#[inline]
pub(crate) fn saturate_pixel(px: [u8; 3], scale: f32) -> [u8; 3] {
    let hsv = rgb_to_hsv(px[0], px[1], px[2]);
    hsv_to_rgb(Hsv {
        h: hsv.h,
        s: (hsv.s * scale).clamp(0.0, 1.0),
        v: hsv.v,
    })
}

/// Scale every channel of one pixel uniformly, clip, and cast.
#[inline]
pub(crate) fn brighten_pixel(px: [u8; 3], factor: f32) -> [u8; 3] {
    px.map(|c| (f32::from(c) * factor).clamp(0.0, 255.0) as u8)
}

/// Boost the HSV value of one pixel when it falls below the shadow threshold.
///
/// The threshold is expressed in 0-255 intensity units against the value
/// channel; pixels at or above it pass through untouched.
#[inline]
pub(crate) fn shadow_pixel(px: [u8; 3], threshold: u8, factor: f32) -> [u8; 3] {
    let hsv = rgb_to_hsv(px[0], px[1], px[2]);
    if hsv.v * 255.0 >= f32::from(threshold) {
        return px;
    }
    hsv_to_rgb(Hsv {
        h: hsv.h,
        s: hsv.s,
        v: (hsv.v * factor).min(1.0),
    })
}

fn map_pixels<F: Fn([u8; 3]) -> [u8; 3]>(image: &RgbImage, kernel: F) -> RgbImage {
    let (width, height) = image.dimensions();
    let row_len = width as usize * 3;
    if row_len == 0 {
        return image.clone();
    }
    let mut buf = image.as_raw().clone();
    for row in buf.chunks_exact_mut(row_len) {
        map_row(row, &kernel);
    }
    RgbImage::from_raw(width, height, buf).expect("buffer length matches dimensions")
}

/// Scale image saturation in HSV space.
///
/// A scale below 1.0 desaturates, above 1.0 boosts; values that would
/// overflow the saturation range are clipped, never wrapped.
#[must_use]
pub fn increase_saturation(image: &RgbImage, scale: f32) -> RgbImage {
    map_pixels(image, |px| saturate_pixel(px, scale))
}

/// Scale image brightness uniformly across all channels.
#[must_use]
pub fn adjust_brightness(image: &RgbImage, factor: f32) -> RgbImage {
    map_pixels(image, |px| brighten_pixel(px, factor))
}

/// Brighten pixels whose HSV value falls below `threshold` (0-255 units).
#[must_use]
pub fn brighten_shadows(image: &RgbImage, threshold: u8, factor: f32) -> RgbImage {
    map_pixels(image, |px| shadow_pixel(px, threshold, factor))
}
