//! Single-image pipeline orchestration
//!
//! The orchestrator runs a linear state machine per image: read bytes ->
//! segment (external) -> decode -> alpha check -> white balance -> saturate
//! -> brighten -> composite -> encode. Numeric stages run on a blocking
//! worker so the coordinating control flow only suspends and resumes.

use crate::backends::{self, TransformBackend};
use crate::config::{ColorAdjustments, OutputFormat, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::segmentation::Segmenter;
use crate::services::{ImageIoService, OutputFormatHandler};
use crate::types::{ProcessedImage, ProcessingMetadata, ProcessingTimings};
use image::{GrayImage, Luma, Rgb, RgbImage};
use instant::Instant;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, span, Level};

/// Orchestrates the full post-processing pipeline for one image at a time.
///
/// The transform strategy is resolved once at construction; the segmentation
/// collaborator is injected. The processor is cheap to share behind an `Arc`
/// and safe to call from many tasks concurrently: every run owns its buffers
/// end to end.
pub struct ProductPhotoProcessor {
    config: PipelineConfig,
    segmenter: Arc<dyn Segmenter>,
    backend: Arc<dyn TransformBackend>,
}

impl ProductPhotoProcessor {
    /// Create a processor with the given configuration and collaborator.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfig` for invalid configuration
    /// values or a transform strategy that fails to initialize.
    pub fn new(config: PipelineConfig, segmenter: Arc<dyn Segmenter>) -> Result<Self> {
        config.validate()?;
        let backend = backends::select_backend(config.execution_mode)?;
        info!(
            backend = backend.name(),
            segmenter = segmenter.name(),
            "pipeline processor ready"
        );
        Ok(Self {
            config,
            segmenter,
            backend,
        })
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the resolved transform strategy
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Process encoded image bytes through the full pipeline.
    ///
    /// This is the programmatic single-image entry point; it performs no file
    /// I/O. The segmentation collaborator is awaited first, then decode and
    /// all numeric work run on a blocking worker.
    ///
    /// # Errors
    ///
    /// - `PipelineError::Segmentation` when the collaborator fails
    /// - `PipelineError::Image` when its reply cannot be decoded
    /// - `PipelineError::UnsupportedFormat` when the reply has no alpha channel
    /// - `PipelineError::Processing` when a transform worker fails
    #[instrument(skip(self, bytes), fields(backend = self.backend.name(), input_bytes = bytes.len()))]
    pub async fn process_bytes(&self, bytes: &[u8]) -> Result<ProcessedImage> {
        let total_start = Instant::now();

        let segmentation_start = Instant::now();
        let cutout = self.segmenter.segment(bytes).await?;
        let segmentation_ms = segmentation_start.elapsed().as_millis() as u64;

        let backend = Arc::clone(&self.backend);
        let color = self.config.color;
        let worker = tokio::task::spawn_blocking(move || run_transform_chain(&*backend, color, &cutout));
        let (image, stage_timings) = worker
            .await
            .map_err(|e| PipelineError::processing(format!("transform worker failed: {e}")))??;

        let dimensions = image.dimensions();
        let timings = ProcessingTimings {
            segmentation_ms,
            decode_ms: stage_timings.decode_ms,
            color_ms: stage_timings.color_ms,
            composite_ms: stage_timings.composite_ms,
            encode_ms: 0,
            total_ms: total_start.elapsed().as_millis() as u64,
        };

        debug!(
            width = dimensions.0,
            height = dimensions.1,
            total_ms = timings.total_ms,
            "pipeline run complete"
        );

        Ok(ProcessedImage {
            image,
            dimensions,
            timings,
            metadata: ProcessingMetadata::new(self.backend.name(), self.segmenter.name()),
        })
    }

    /// Process one image file and write exactly one output file on success.
    ///
    /// Nothing is written when any stage fails. Parent directories of
    /// `output` are created as needed; the output format is resolved from the
    /// configuration against the input's extension.
    ///
    /// # Errors
    ///
    /// Everything [`Self::process_bytes`] returns, plus `PipelineError::Io`
    /// for unreadable inputs or unwritable outputs.
    #[instrument(skip_all, fields(input = %input.as_ref().display()))]
    pub async fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<ProcessedImage> {
        let input_ref = input.as_ref();
        let output_ref = output.as_ref();

        if !input_ref.exists() {
            return Err(PipelineError::file_io_error(
                "read input image",
                input_ref,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        let bytes = tokio::fs::read(input_ref)
            .await
            .map_err(|e| PipelineError::file_io_error("read input image", input_ref, e))?;

        let mut processed = self.process_bytes(&bytes).await?;

        let format = OutputFormatHandler::resolve(self.config.output_format, input_ref);
        let quality = match format {
            OutputFormat::Jpeg => self.config.jpeg_quality,
            OutputFormat::WebP => self.config.webp_quality,
            OutputFormat::Auto | OutputFormat::Png => 100,
        };

        let encode_start = Instant::now();
        let encoded = OutputFormatHandler::encode(&processed.image, format, quality)?;
        processed.timings.encode_ms = encode_start.elapsed().as_millis() as u64;

        ImageIoService::write_output(output_ref, &encoded)?;

        info!(
            output = %output_ref.display(),
            format = %format,
            bytes = encoded.len(),
            "wrote processed image"
        );
        Ok(processed)
    }
}

/// Timings for the synchronous part of the chain
struct StageTimings {
    decode_ms: u64,
    color_ms: u64,
    composite_ms: u64,
}

/// Decode the segmentation reply and run the numeric chain.
///
/// Runs on a blocking worker; owns all its buffers.
fn run_transform_chain(
    backend: &dyn TransformBackend,
    color: ColorAdjustments,
    cutout: &[u8],
) -> Result<(RgbImage, StageTimings)> {
    let decode_start = Instant::now();
    let decoded = ImageIoService::load_from_bytes(cutout)?;

    // The collaborator contract requires a 4-channel decoded form. Anything
    // else fails the job before any output can be written.
    let color_type = decoded.color();
    if !color_type.has_alpha() || color_type.channel_count() != 4 {
        return Err(PipelineError::unsupported_format(format!(
            "segmentation reply decoded to {color_type:?}, expected a 4-channel image with alpha"
        )));
    }

    let rgba = decoded.to_rgba8();
    let (rgb, alpha) = split_alpha(&rgba);
    let decode_ms = decode_start.elapsed().as_millis() as u64;

    let color_start = Instant::now();
    let adjusted = {
        let _span = span!(Level::DEBUG, "color_chain").entered();
        let balanced = backend.white_balance(&rgb);
        let saturated = backend.saturate(&balanced, color.saturation_scale);
        let brightened = backend.brighten(&saturated, color.brightness_factor);
        if color.brighten_shadows {
            backend.brighten_shadows(&brightened, color.shadow_threshold, color.shadow_boost)
        } else {
            brightened
        }
    };
    let color_ms = color_start.elapsed().as_millis() as u64;

    let composite_start = Instant::now();
    let composited = {
        let _span = span!(Level::DEBUG, "composite").entered();
        backend.composite_onto_white(&adjusted, &alpha)?
    };
    let composite_ms = composite_start.elapsed().as_millis() as u64;

    Ok((
        composited,
        StageTimings {
            decode_ms,
            color_ms,
            composite_ms,
        },
    ))
}

/// Split an RGBA buffer into its RGB image and alpha plane.
fn split_alpha(rgba: &image::RgbaImage) -> (RgbImage, GrayImage) {
    let (width, height) = rgba.dimensions();
    let mut rgb = RgbImage::new(width, height);
    let mut alpha = GrayImage::new(width, height);
    for (x, y, px) in rgba.enumerate_pixels() {
        rgb.put_pixel(x, y, Rgb([px[0], px[1], px[2]]));
        alpha.put_pixel(x, y, Luma([px[3]]));
    }
    (rgb, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::Segmenter;
    use async_trait::async_trait;
    use image::{ImageEncoder, Rgba};

    /// Collaborator that attaches a fixed alpha pattern to whatever it is
    /// given, mimicking a background-removal model.
    struct MaskingSegmenter {
        alpha: Vec<u8>,
    }

    #[async_trait]
    impl Segmenter for MaskingSegmenter {
        async fn segment(&self, encoded: &[u8]) -> Result<Vec<u8>> {
            let decoded = ImageIoService::load_from_bytes(encoded)?.to_rgb8();
            let (width, height) = decoded.dimensions();
            assert_eq!(self.alpha.len(), (width * height) as usize);
            let mut rgba = image::RgbaImage::new(width, height);
            for (i, (x, y, px)) in decoded.enumerate_pixels().enumerate() {
                rgba.put_pixel(x, y, Rgba([px[0], px[1], px[2], self.alpha[i]]));
            }
            let mut buf = Vec::new();
            image::codecs::png::PngEncoder::new(&mut buf)
                .write_image(
                    rgba.as_raw(),
                    width,
                    height,
                    image::ExtendedColorType::Rgba8,
                )
                .unwrap();
            Ok(buf)
        }

        fn name(&self) -> &str {
            "masking-mock"
        }
    }

    /// Collaborator that returns its input unchanged (no alpha added).
    struct PassthroughSegmenter;

    #[async_trait]
    impl Segmenter for PassthroughSegmenter {
        async fn segment(&self, encoded: &[u8]) -> Result<Vec<u8>> {
            Ok(encoded.to_vec())
        }

        fn name(&self) -> &str {
            "passthrough-mock"
        }
    }

    fn encode_rgb_png(image: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_missing_alpha_fails_fast() {
        let processor = ProductPhotoProcessor::new(
            PipelineConfig::default(),
            Arc::new(PassthroughSegmenter),
        )
        .unwrap();

        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        let err = processor
            .process_bytes(&encode_rgb_png(&img))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_transparent_pixels_land_on_white() {
        let processor = ProductPhotoProcessor::new(
            PipelineConfig::default(),
            Arc::new(MaskingSegmenter {
                alpha: vec![0, 0, 0, 0],
            }),
        )
        .unwrap();

        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([90, 140, 10]));
        img.put_pixel(1, 1, Rgb([5, 200, 77]));
        let processed = processor
            .process_bytes(&encode_rgb_png(&img))
            .await
            .unwrap();
        for px in processed.image.pixels() {
            assert_eq!(px.0, [255, 255, 255]);
        }
    }

    #[tokio::test]
    async fn test_unreadable_bytes_fail_with_decode_error() {
        let processor = ProductPhotoProcessor::new(
            PipelineConfig::default(),
            Arc::new(PassthroughSegmenter),
        )
        .unwrap();
        let err = processor.process_bytes(&[0u8; 32]).await.unwrap_err();
        assert!(matches!(err, PipelineError::Image(_)));
    }

    #[test]
    fn test_split_alpha() {
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([1, 2, 3, 200]));
        rgba.put_pixel(1, 0, Rgba([4, 5, 6, 0]));
        let (rgb, alpha) = split_alpha(&rgba);
        assert_eq!(rgb.get_pixel(0, 0).0, [1, 2, 3]);
        assert_eq!(rgb.get_pixel(1, 0).0, [4, 5, 6]);
        assert_eq!(alpha.get_pixel(0, 0).0, [200]);
        assert_eq!(alpha.get_pixel(1, 0).0, [0]);
    }
}
