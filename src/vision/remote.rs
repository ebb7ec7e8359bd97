//! HTTP adapter for a remote vision inference endpoint.

use super::{Diagnosis, VisionClassifier};
use crate::error::{DaunError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout for classification requests.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Classifier backed by an HTTP inference endpoint.
///
/// The endpoint receives raw image bytes and replies with JSON
/// `{"label": "...", "confidence": <0-100>}`.
pub struct RemoteVisionClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteVisionClassifier {
    /// Create a classifier for the given endpoint URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DaunError::Vision(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl VisionClassifier for RemoteVisionClassifier {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn classify(&self, image: &[u8]) -> Result<Diagnosis> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| DaunError::Vision(format!("Inference request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DaunError::Vision(format!(
                "Inference endpoint returned {}",
                response.status()
            )));
        }

        let diagnosis: Diagnosis = response
            .json()
            .await
            .map_err(|e| DaunError::Vision(format!("Invalid inference response: {}", e)))?;

        debug!(
            "Classified as '{}' ({:.1}% confidence)",
            diagnosis.label, diagnosis.confidence
        );
        Ok(diagnosis)
    }
}
