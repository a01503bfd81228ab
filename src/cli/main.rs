//! Product photo processing CLI
//!
//! Thin frontend over the library: argument parsing, tracing setup, and
//! progress display around the batch scheduler.

use crate::batch::{BatchScheduler, BatchSummary, ProgressListener};
use crate::config::{ExecutionMode, OutputFormat, PipelineConfig};
use crate::pipeline::ProductPhotoProcessor;
use crate::segmentation::HttpSegmenter;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Product photo post-processing tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "prodshot")]
pub struct Cli {
    /// Input image file or directory tree
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (single input) or directory (batch processing)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Auto)]
    pub format: CliOutputFormat,

    /// Segmentation service endpoint
    #[arg(short, long, default_value = "http://127.0.0.1:7000/api/remove")]
    pub endpoint: String,

    /// Transform execution mode
    #[arg(short, long, value_enum, default_value_t = CliExecutionMode::Auto)]
    pub mode: CliExecutionMode,

    /// Saturation scale factor
    #[arg(long, default_value_t = 1.2)]
    pub saturation: f32,

    /// Brightness multiplier
    #[arg(long, default_value_t = 1.1)]
    pub brightness: f32,

    /// Enable the shadow-brightening step
    #[arg(long)]
    pub brighten_shadows: bool,

    /// Shadow threshold in value-channel units (0-255)
    #[arg(long, default_value_t = 80)]
    pub shadow_threshold: u8,

    /// Shadow boost factor
    #[arg(long, default_value_t = 1.2)]
    pub shadow_boost: f32,

    /// JPEG quality (0-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// Maximum concurrent jobs (0 = number of CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write the batch summary as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Auto,
    Png,
    Jpeg,
    Webp,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Auto => Self::Auto,
            CliOutputFormat::Png => Self::Png,
            CliOutputFormat::Jpeg => Self::Jpeg,
            CliOutputFormat::Webp => Self::WebP,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliExecutionMode {
    Auto,
    Scalar,
    Parallel,
}

impl From<CliExecutionMode> for ExecutionMode {
    fn from(mode: CliExecutionMode) -> Self {
        match mode {
            CliExecutionMode::Auto => Self::Auto,
            CliExecutionMode::Scalar => Self::Scalar,
            CliExecutionMode::Parallel => Self::Parallel,
        }
    }
}

/// Progress listener backed by an indicatif spinner
struct SpinnerListener {
    bar: ProgressBar,
}

impl ProgressListener for SpinnerListener {
    fn on_job_finished(&self, input: &Path, error: Option<&str>) {
        match error {
            None => self.bar.set_message(format!("done: {}", input.display())),
            Some(reason) => self
                .bar
                .set_message(format!("failed: {} ({reason})", input.display())),
        }
        self.bar.inc(1);
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let config = PipelineConfig::builder()
        .execution_mode(cli.mode.into())
        .output_format(cli.format.into())
        .jpeg_quality(cli.jpeg_quality)
        .saturation_scale(cli.saturation)
        .brightness_factor(cli.brightness)
        .brighten_shadows(cli.brighten_shadows)
        .shadow_threshold(cli.shadow_threshold)
        .shadow_boost(cli.shadow_boost)
        .max_concurrent_jobs(cli.jobs)
        .build()
        .context("Invalid pipeline configuration")?;

    let segmenter =
        Arc::new(HttpSegmenter::new(&cli.endpoint).context("Failed to create segmenter")?);
    let processor = Arc::new(
        ProductPhotoProcessor::new(config, segmenter)
            .context("Failed to create pipeline processor")?,
    );

    info!(
        input = %cli.input.display(),
        endpoint = %cli.endpoint,
        backend = processor.backend_name(),
        "starting prodshot"
    );

    let start = Instant::now();
    if cli.input.is_dir() {
        run_batch(&cli, processor).await?;
    } else {
        run_single(&cli, &processor).await?;
    }
    info!("finished in {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

async fn run_single(cli: &Cli, processor: &ProductPhotoProcessor) -> Result<()> {
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_single_output(&cli.input));

    processor
        .process_file(&cli.input, &output)
        .await
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;

    println!("processed {} -> {}", cli.input.display(), output.display());
    Ok(())
}

async fn run_batch(cli: &Cli, processor: Arc<ProductPhotoProcessor>) -> Result<()> {
    let output_root = cli
        .output
        .clone()
        .unwrap_or_else(|| default_batch_output(&cli.input));

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} done {msg}")
            .expect("static template is valid"),
    );
    let listener = Arc::new(SpinnerListener { bar: bar.clone() });

    let scheduler = BatchScheduler::new(processor).with_listener(listener);
    let summary = scheduler
        .run(&cli.input, &output_root)
        .await
        .with_context(|| format!("Batch run failed for {}", cli.input.display()))?;

    bar.finish_with_message(format!(
        "processed: {}, failed: {}",
        summary.processed, summary.failed
    ));

    report_summary(&summary);

    if let Some(ref path) = cli.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }

    println!(
        "{} of {} image(s) processed into {} ({} failed)",
        summary.processed,
        summary.total,
        output_root.display(),
        summary.failed
    );
    Ok(())
}

fn report_summary(summary: &BatchSummary) {
    if summary.failed > 0 {
        warn!(
            processed = summary.processed,
            failed = summary.failed,
            "some files failed to process"
        );
        for failure in &summary.failures {
            eprintln!("failed: {}: {}", failure.input.display(), failure.reason);
        }
    }
}

/// Default output path for a single file: `processed_<name>` alongside it.
fn default_single_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map_or_else(|| "processed".into(), |n| n.to_string_lossy().into_owned());
    input.with_file_name(format!("processed_{name}"))
}

/// Default output root for a batch: `<dir>_processed` alongside the input.
fn default_batch_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map_or_else(|| "output".into(), |n| n.to_string_lossy().into_owned());
    input.with_file_name(format!("{name}_processed"))
}

fn init_tracing(verbose: u8) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("prodshot={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}
