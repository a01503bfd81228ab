#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # prodshot
//!
//! Post-processing pipeline for e-commerce product photos: removes the
//! background via an external segmentation collaborator, color-corrects the
//! remaining foreground with a multi-method white-balance chain, and
//! composites it onto a solid white background. Runs as a batch job over a
//! directory tree or as a programmatic single-image call.
//!
//! ## Pipeline
//!
//! ```text
//! bytes -> segment (external) -> decode -> white balance chain ->
//! saturation -> brightness -> composite onto white -> encode
//! ```
//!
//! The white-balance chain applies four methods in a fixed order
//! (white-patch, gray-world, perfect-reflector, adaptive); each stage
//! re-normalizes the previous stage's output, producing a stronger net
//! cast correction than any single method. Compositing is a linear blend
//! toward white weighted by the segmentation alpha, so anti-aliased mask
//! edges stay smooth instead of turning into hard cutouts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prodshot::{HttpSegmenter, PipelineConfig, ProductPhotoProcessor};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let segmenter = Arc::new(HttpSegmenter::new("http://127.0.0.1:7000/api/remove")?);
//! let config = PipelineConfig::builder()
//!     .saturation_scale(1.2)
//!     .brightness_factor(1.1)
//!     .build()?;
//! let processor = ProductPhotoProcessor::new(config, segmenter)?;
//!
//! // Single image
//! processor.process_file("input/shoe.jpg", "output/shoe.jpg").await?;
//!
//! // Whole directory tree, mirrored structure
//! let scheduler = prodshot::BatchScheduler::new(Arc::new(processor));
//! let summary = scheduler.run("input", "output").await?;
//! println!("{} processed, {} failed", summary.processed, summary.failed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution strategies
//!
//! All numeric stages run through a [`backends::TransformBackend`]. The
//! scalar and parallel strategies are bit-identical; `ExecutionMode::Auto`
//! probes available parallelism once at processor construction and the
//! choice holds for the whole run.

pub mod backends;
pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod composite;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod segmentation;
pub mod services;
pub mod types;

use std::path::Path;
use std::sync::Arc;

// Public API exports
pub use backends::{select_backend, ParallelBackend, ScalarBackend, TransformBackend};
pub use batch::{BatchScheduler, BatchSummary, JobFailure, ProcessingJob, ProgressListener};
pub use composite::composite_onto_white;
pub use config::{
    ColorAdjustments, ExecutionMode, OutputFormat, PipelineConfig, PipelineConfigBuilder,
};
pub use error::{PipelineError, Result};
pub use pipeline::ProductPhotoProcessor;
pub use segmentation::{HttpSegmenter, Segmenter};
pub use services::{ImageIoService, OutputFormatHandler};
pub use types::{ProcessedImage, ProcessingMetadata, ProcessingTimings};

/// Process one encoded image in memory.
///
/// Convenience wrapper that builds a processor for a single run. Callers
/// processing many images should construct a [`ProductPhotoProcessor`] once
/// and reuse it.
///
/// # Errors
///
/// Everything [`ProductPhotoProcessor::process_bytes`] returns, plus
/// configuration validation errors.
pub async fn process_image_bytes(
    bytes: &[u8],
    config: &PipelineConfig,
    segmenter: Arc<dyn Segmenter>,
) -> Result<ProcessedImage> {
    let processor = ProductPhotoProcessor::new(config.clone(), segmenter)?;
    processor.process_bytes(bytes).await
}

/// Process a whole directory tree, mirroring its structure into
/// `output_root`.
///
/// # Errors
///
/// Returns configuration validation errors and a missing-input-root error;
/// per-image failures are contained in the returned summary.
pub async fn process_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input_root: P,
    output_root: Q,
    config: &PipelineConfig,
    segmenter: Arc<dyn Segmenter>,
) -> Result<BatchSummary> {
    let processor = Arc::new(ProductPhotoProcessor::new(config.clone(), segmenter)?);
    BatchScheduler::new(processor).run(input_root, output_root).await
}
