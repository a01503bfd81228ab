//! Batch scheduling over a directory tree
//!
//! Discovers eligible images under an input root, mirrors their relative
//! paths onto an output root, and fans jobs out to the processor with
//! bounded concurrency. One failing job never aborts its siblings; failures
//! are logged with file identity and collected into the summary.

use crate::config::OutputFormat;
use crate::error::{PipelineError, Result};
use crate::pipeline::ProductPhotoProcessor;
use crate::services::{ImageIoService, OutputFormatHandler};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use walkdir::WalkDir;

/// One (input path, output path) pair
///
/// Created during discovery, consumed by exactly one pipeline run, never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingJob {
    /// Source image path under the input root
    pub input: PathBuf,
    /// Mirrored destination path under the output root
    pub output: PathBuf,
}

/// A failed job with its one-line reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFailure {
    /// Input file that failed
    pub input: PathBuf,
    /// Rendered error message
    pub reason: String,
}

/// Outcome of one batch invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of discovered jobs
    pub total: usize,
    /// Jobs that wrote an output file
    pub processed: usize,
    /// Jobs that failed (logged, never retried)
    pub failed: usize,
    /// Failure details, one entry per failed job
    pub failures: Vec<JobFailure>,
}

/// Observer for per-job completion, used by frontends for progress display
pub trait ProgressListener: Send + Sync {
    /// Called after each job finishes, successfully or not
    fn on_job_finished(&self, input: &Path, error: Option<&str>);
}

/// Runs the pipeline over a directory tree with bounded parallelism.
///
/// The scheduler owns the output tree: it is the only writer, and each job's
/// output is fully written or absent.
pub struct BatchScheduler {
    processor: Arc<ProductPhotoProcessor>,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl BatchScheduler {
    /// Create a scheduler around a shared processor.
    #[must_use]
    pub fn new(processor: Arc<ProductPhotoProcessor>) -> Self {
        Self {
            processor,
            listener: None,
        }
    }

    /// Attach a per-job completion listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Number of jobs allowed in flight at once.
    fn concurrency_limit(&self) -> usize {
        let configured = self.processor.config().max_concurrent_jobs;
        if configured > 0 {
            configured
        } else {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        }
    }

    /// Process every eligible image under `input_root`, mirroring outputs
    /// under `output_root`.
    ///
    /// Jobs run in any interleaving; only the in-flight bound is guaranteed.
    /// Per-job errors are contained here: they are logged with the file
    /// identity, recorded in the summary, and the batch continues.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` when `input_root` does not exist or is not
    /// a directory. Individual job failures never surface as an `Err`.
    pub async fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_root: P,
        output_root: Q,
    ) -> Result<BatchSummary> {
        let input_root = input_root.as_ref();
        let output_root = output_root.as_ref();

        if !input_root.is_dir() {
            return Err(PipelineError::file_io_error(
                "read input directory",
                input_root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "directory does not exist"),
            ));
        }

        let jobs = discover_jobs(
            input_root,
            output_root,
            self.processor.config().output_format,
        );
        let mut summary = BatchSummary {
            total: jobs.len(),
            ..BatchSummary::default()
        };

        if jobs.is_empty() {
            warn!(
                input_root = %input_root.display(),
                "no supported image files found"
            );
            return Ok(summary);
        }

        let limit = self.concurrency_limit();
        info!(
            jobs = jobs.len(),
            concurrency = limit,
            input_root = %input_root.display(),
            output_root = %output_root.display(),
            "starting batch run"
        );

        let semaphore = Arc::new(Semaphore::new(limit));
        let mut workers: JoinSet<(ProcessingJob, std::result::Result<(), String>)> =
            JoinSet::new();

        for job in jobs {
            let semaphore = Arc::clone(&semaphore);
            let processor = Arc::clone(&self.processor);
            workers.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (job, Err("scheduler shut down".to_string())),
                };
                let outcome = processor
                    .process_file(&job.input, &job.output)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string());
                (job, outcome)
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((job, Ok(()))) => {
                    summary.processed += 1;
                    if let Some(ref listener) = self.listener {
                        listener.on_job_finished(&job.input, None);
                    }
                },
                Ok((job, Err(reason))) => {
                    warn!(
                        input = %job.input.display(),
                        %reason,
                        "failed to process image"
                    );
                    if let Some(ref listener) = self.listener {
                        listener.on_job_finished(&job.input, Some(&reason));
                    }
                    summary.failed += 1;
                    summary.failures.push(JobFailure {
                        input: job.input,
                        reason,
                    });
                },
                Err(join_error) => {
                    // A worker panicked; contain it like any other job failure
                    warn!(error = %join_error, "batch worker crashed");
                    summary.failed += 1;
                    summary.failures.push(JobFailure {
                        input: PathBuf::from("<unknown>"),
                        reason: format!("worker crashed: {join_error}"),
                    });
                },
            }
        }

        info!(
            processed = summary.processed,
            failed = summary.failed,
            "batch run complete"
        );
        Ok(summary)
    }
}

/// Enumerate eligible images under `input_root` and pair each with its
/// mirrored output path.
///
/// Discovery order is sorted for determinism; dispatch order is not part of
/// the contract. Files whose relative path cannot be computed are skipped.
fn discover_jobs(input_root: &Path, output_root: &Path, format: OutputFormat) -> Vec<ProcessingJob> {
    let mut jobs: Vec<ProcessingJob> = WalkDir::new(input_root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| ImageIoService::is_supported_extension(entry.path()))
        .filter_map(|entry| {
            let input = entry.path().to_path_buf();
            let mut output = ImageIoService::mirror_into(&input, input_root, output_root).ok()?;
            if format != OutputFormat::Auto {
                output.set_extension(OutputFormatHandler::extension(format));
            }
            Some(ProcessingJob { input, output })
        })
        .collect();
    jobs.sort_by(|a, b| a.input.cmp(&b.input));
    jobs
}
