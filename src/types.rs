//! Core result types for pipeline operations

use crate::config::OutputFormat;
use crate::error::Result;
use crate::services::OutputFormatHandler;
use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-stage wall-clock timings in milliseconds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Time spent waiting on the segmentation collaborator
    pub segmentation_ms: u64,
    /// Time spent decoding the segmentation reply
    pub decode_ms: u64,
    /// Time spent in the color transform chain
    pub color_ms: u64,
    /// Time spent compositing onto the white canvas
    pub composite_ms: u64,
    /// Time spent encoding the output (only set when an output is written)
    pub encode_ms: u64,
    /// End-to-end time for the whole run
    pub total_ms: u64,
}

/// Metadata describing how a result was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// When processing finished
    pub completed_at: DateTime<Utc>,
    /// Transform backend that executed the chain
    pub backend: String,
    /// Segmentation collaborator that produced the alpha mask
    pub segmenter: String,
}

impl ProcessingMetadata {
    #[must_use]
    pub fn new(backend: &str, segmenter: &str) -> Self {
        Self {
            completed_at: Utc::now(),
            backend: backend.to_string(),
            segmenter: segmenter.to_string(),
        }
    }
}

/// Result of one single-image pipeline run
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// The fully opaque composited image
    pub image: RgbImage,

    /// Output dimensions (identical to the segmented input's dimensions)
    pub dimensions: (u32, u32),

    /// Per-stage timings
    pub timings: ProcessingTimings,

    /// Processing metadata
    pub metadata: ProcessingMetadata,
}

impl ProcessedImage {
    /// Encode the image in the given format.
    ///
    /// `OutputFormat::Auto` falls back to PNG since there is no input
    /// extension to mirror here. `quality` applies to lossy formats only.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Image` on encoding failures.
    pub fn to_bytes(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        OutputFormatHandler::encode(&self.image, format, quality)
    }

    /// Encode and write the image to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Image` on encoding failures and
    /// `PipelineError::Io` on write failures.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        let encoded = self.to_bytes(format, quality)?;
        crate::services::ImageIoService::write_output(path, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample() -> ProcessedImage {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        ProcessedImage {
            image,
            dimensions: (2, 2),
            timings: ProcessingTimings::default(),
            metadata: ProcessingMetadata::new("scalar", "mock"),
        }
    }

    #[test]
    fn test_to_bytes_png_round_trip() {
        let result = sample();
        let bytes = result.to_bytes(OutputFormat::Png, 100).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_auto_format_encodes_as_png() {
        let result = sample();
        let bytes = result.to_bytes(OutputFormat::Auto, 100).unwrap();
        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Png
        );
    }

    #[test]
    fn test_metadata_records_names() {
        let result = sample();
        assert_eq!(result.metadata.backend, "scalar");
        assert_eq!(result.metadata.segmenter, "mock");
    }
}
