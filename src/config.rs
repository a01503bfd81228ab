//! Configuration types for the product photo pipeline

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Execution strategy for the pixel transform chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Probe hardware once and pick the best available strategy
    Auto,
    /// Sequential execution on the calling worker thread
    Scalar,
    /// Row-parallel execution on the rayon thread pool
    Parallel,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Scalar => write!(f, "scalar"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Keep the input's format where representable, otherwise PNG
    Auto,
    /// PNG (lossless)
    Png,
    /// JPEG (lossy, quality-controlled)
    Jpeg,
    /// WebP (lossless encoding)
    WebP,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Auto
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
        }
    }
}

/// Per-step color adjustment parameters
///
/// Plain value record recreated per pipeline run; nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorAdjustments {
    /// Multiplier applied to the HSV saturation channel
    pub saturation_scale: f32,

    /// Uniform multiplier applied to every RGB channel
    pub brightness_factor: f32,

    /// Value-channel intensity (0-255) below which a pixel counts as shadow
    pub shadow_threshold: u8,

    /// Multiplier applied to the value channel of shadow pixels
    pub shadow_boost: f32,

    /// Enable the shadow-brightening step in the chain (off by default)
    pub brighten_shadows: bool,
}

impl Default for ColorAdjustments {
    fn default() -> Self {
        Self {
            saturation_scale: 1.2,
            brightness_factor: 1.1,
            shadow_threshold: 80,
            shadow_boost: 1.2,
            brighten_shadows: false,
        }
    }
}

/// Configuration for pipeline construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Transform execution strategy, resolved once at processor construction
    pub execution_mode: ExecutionMode,

    /// Output format
    pub output_format: OutputFormat,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,

    /// WebP quality (0-100, reserved; current encoding is lossless)
    pub webp_quality: u8,

    /// Color adjustment parameters for the transform chain
    pub color: ColorAdjustments,

    /// Maximum number of batch jobs in flight (0 = number of CPUs)
    pub max_concurrent_jobs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            execution_mode: ExecutionMode::default(),
            output_format: OutputFormat::default(),
            jpeg_quality: 90,
            webp_quality: 85,
            color: ColorAdjustments::default(),
            max_concurrent_jobs: 0, // Auto-detect from available parallelism
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder for fluent construction
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Validate the configuration values
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfig` for out-of-range quality values
    /// or non-finite/negative adjustment factors.
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality > 100 {
            return Err(PipelineError::invalid_config("JPEG quality must be 0-100"));
        }
        if self.webp_quality > 100 {
            return Err(PipelineError::invalid_config("WebP quality must be 0-100"));
        }
        for (name, value) in [
            ("saturation scale", self.color.saturation_scale),
            ("brightness factor", self.color.brightness_factor),
            ("shadow boost", self.color.shadow_boost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::invalid_config(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for `PipelineConfig`
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    #[must_use]
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.config.execution_mode = mode;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    #[must_use]
    pub fn webp_quality(mut self, quality: u8) -> Self {
        self.config.webp_quality = quality;
        self
    }

    #[must_use]
    pub fn saturation_scale(mut self, scale: f32) -> Self {
        self.config.color.saturation_scale = scale;
        self
    }

    #[must_use]
    pub fn brightness_factor(mut self, factor: f32) -> Self {
        self.config.color.brightness_factor = factor;
        self
    }

    #[must_use]
    pub fn brighten_shadows(mut self, enabled: bool) -> Self {
        self.config.color.brighten_shadows = enabled;
        self
    }

    #[must_use]
    pub fn shadow_threshold(mut self, threshold: u8) -> Self {
        self.config.color.shadow_threshold = threshold;
        self
    }

    #[must_use]
    pub fn shadow_boost(mut self, boost: f32) -> Self {
        self.config.color.shadow_boost = boost;
        self
    }

    #[must_use]
    pub fn color(mut self, color: ColorAdjustments) -> Self {
        self.config.color = color;
        self
    }

    #[must_use]
    pub fn max_concurrent_jobs(mut self, jobs: usize) -> Self {
        self.config.max_concurrent_jobs = jobs;
        self
    }

    /// Build the pipeline configuration
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfig` when validation fails.
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
