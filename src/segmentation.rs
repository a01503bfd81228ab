//! Segmentation collaborator contract
//!
//! Background removal itself is delegated to an external pretrained model:
//! the collaborator accepts raw encoded image bytes and returns raw encoded
//! bytes whose decoded form carries an alpha channel. The pipeline treats it
//! as an opaque function and validates the channel layout of whatever comes
//! back.

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use tracing::debug;

/// External background-removal collaborator
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Run segmentation on encoded image bytes, returning encoded bytes whose
    /// decoded form has an alpha channel marking the foreground.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Segmentation` when the collaborator cannot
    /// produce a result (transport failure, non-success status, etc.).
    async fn segment(&self, encoded: &[u8]) -> Result<Vec<u8>>;

    /// Collaborator name for logs and metadata
    fn name(&self) -> &str;
}

/// HTTP-backed segmentation collaborator
///
/// Posts the raw encoded image to a rembg-style endpoint and returns the
/// response body verbatim. The decoded shape of the reply is validated by the
/// pipeline, not here.
pub struct HttpSegmenter {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSegmenter {
    /// Create a segmenter targeting the given endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Segmentation` when the HTTP client cannot be
    /// constructed.
    pub fn new<S: Into<String>>(endpoint: S) -> Result<Self> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            PipelineError::segmentation(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Create a segmenter reusing an existing HTTP client.
    #[must_use]
    pub fn with_client<S: Into<String>>(endpoint: S, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    /// The endpoint this segmenter talks to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Segmenter for HttpSegmenter {
    async fn segment(&self, encoded: &[u8]) -> Result<Vec<u8>> {
        debug!(
            endpoint = %self.endpoint,
            input_bytes = encoded.len(),
            "dispatching segmentation request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(encoded.to_vec())
            .send()
            .await
            .map_err(|e| {
                PipelineError::segmentation(format!(
                    "request to '{}' failed: {e}",
                    self.endpoint
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::segmentation(format!(
                "endpoint '{}' returned status {status}",
                self.endpoint
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            PipelineError::segmentation(format!("failed to read segmentation reply: {e}"))
        })?;

        debug!(output_bytes = body.len(), "segmentation reply received");
        Ok(body.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}
