//! Error types for the product photo pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error types for single-image and batch processing operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode or encode errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Segmentation collaborator failures (transport, status, malformed reply)
    #[error("Segmentation error: {0}")]
    Segmentation(String),

    /// Decoded segmentation output has an unusable channel layout
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transform or worker failures during processing
    #[error("Processing error: {0}")]
    Processing(String),
}

impl PipelineError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(msg: S) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Create a new segmentation error
    pub fn segmentation<S: Into<String>>(msg: S) -> Self {
        Self::Segmentation(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create a decode error with source context
    pub fn decode_error(context: &str, error: image::ImageError) -> Self {
        Self::Image(image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {}", context, error),
        )))
    }
}
