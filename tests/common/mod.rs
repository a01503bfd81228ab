//! Shared fixtures for integration tests

#![allow(dead_code)]
#![allow(unreachable_pub)]

use async_trait::async_trait;
use image::{ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use prodshot::{Result, Segmenter};

/// Deterministic stand-in for the external background-removal model.
///
/// Decodes whatever it is given, attaches an alpha plane, and re-encodes as
/// PNG. With `alpha: None` every pixel is fully opaque; otherwise the given
/// row-major values are used and must match the input pixel count.
pub struct MaskSegmenter {
    pub alpha: Option<Vec<u8>>,
}

impl MaskSegmenter {
    pub fn opaque() -> Self {
        Self { alpha: None }
    }

    pub fn with_alpha(alpha: Vec<u8>) -> Self {
        Self { alpha: Some(alpha) }
    }
}

#[async_trait]
impl Segmenter for MaskSegmenter {
    async fn segment(&self, encoded: &[u8]) -> Result<Vec<u8>> {
        let decoded = prodshot::ImageIoService::load_from_bytes(encoded)?.to_rgb8();
        let (width, height) = decoded.dimensions();
        if let Some(ref alpha) = self.alpha {
            assert_eq!(alpha.len(), (width * height) as usize, "alpha fixture size");
        }
        let mut rgba = RgbaImage::new(width, height);
        for (i, (x, y, px)) in decoded.enumerate_pixels().enumerate() {
            let a = self.alpha.as_ref().map_or(255, |values| values[i]);
            rgba.put_pixel(x, y, Rgba([px[0], px[1], px[2], a]));
        }
        Ok(encode_png_rgba(&rgba))
    }

    fn name(&self) -> &str {
        "mask-fixture"
    }
}

/// Returns its input unchanged; the decoded reply therefore has no alpha.
pub struct PassthroughSegmenter;

#[async_trait]
impl Segmenter for PassthroughSegmenter {
    async fn segment(&self, encoded: &[u8]) -> Result<Vec<u8>> {
        Ok(encoded.to_vec())
    }

    fn name(&self) -> &str {
        "passthrough-fixture"
    }
}

pub fn encode_png_rgb(image: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .expect("in-memory PNG encoding");
    buf
}

pub fn encode_png_rgba(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .expect("in-memory PNG encoding");
    buf
}

pub fn encode_jpeg_rgb(image: &RgbImage, quality: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .expect("in-memory JPEG encoding");
    buf
}

/// Small image with distinct per-pixel colors
pub fn sample_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (40 + x * 90 + y * 13) as u8,
            (160_u32.wrapping_sub(x * 35).wrapping_add(y * 41) % 256) as u8,
            (25 + x * 17 + y * 77) as u8,
        ])
    })
}
