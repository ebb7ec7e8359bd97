//! Leaf-disease image classification, consumed as an external collaborator.
//!
//! The classifier itself (a pretrained vision model) lives behind an HTTP
//! inference endpoint; the core only uses its predicted label to build the
//! initial follow-up question for the RAG pipeline.

mod remote;

pub use remote::RemoteVisionClassifier;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A classifier prediction for one leaf photograph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Predicted disease label (e.g., "leaf curl", "healthy").
    pub label: String,
    /// Prediction confidence as a percentage, 0-100.
    pub confidence: f32,
}

/// Trait for leaf-disease image classification.
#[async_trait]
pub trait VisionClassifier: Send + Sync {
    /// Classify a single image.
    async fn classify(&self, image: &[u8]) -> Result<Diagnosis>;
}
