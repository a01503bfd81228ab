//! Output format resolution and encoding

use crate::config::OutputFormat;
use crate::error::Result;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::path::Path;

/// Service for output format handling
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Resolve `Auto` against the input file's extension.
    ///
    /// Inputs whose extension maps to a supported encoder keep their format;
    /// anything else normalizes to PNG. Explicit formats pass through.
    #[must_use]
    pub fn resolve<P: AsRef<Path>>(format: OutputFormat, input: P) -> OutputFormat {
        if format != OutputFormat::Auto {
            return format;
        }
        let extension = input
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("jpg" | "jpeg") => OutputFormat::Jpeg,
            Some("webp") => OutputFormat::WebP,
            _ => OutputFormat::Png,
        }
    }

    /// File extension for a resolved format (without the dot).
    #[must_use]
    pub fn extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Auto | OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    /// Encode an RGB image to bytes in the given format.
    ///
    /// `quality` applies to JPEG; PNG is lossless and WebP currently encodes
    /// losslessly. An unresolved `Auto` encodes as PNG.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Image` on encoder failures, and
    /// `PipelineError::UnsupportedFormat` for WebP when the crate was built
    /// without WebP support.
    pub fn encode(image: &RgbImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Auto | OutputFormat::Png => {
                image::codecs::png::PngEncoder::new(&mut buffer).write_image(
                    image.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
            },
            OutputFormat::Jpeg => {
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality)
                    .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            },
            OutputFormat::WebP => {
                #[cfg(feature = "webp-support")]
                image::codecs::webp::WebPEncoder::new_lossless(&mut buffer).write_image(
                    image.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
                #[cfg(not(feature = "webp-support"))]
                return Err(crate::error::PipelineError::unsupported_format(
                    "WebP output requires the webp-support feature",
                ));
            },
        }
        Ok(buffer)
    }
}
