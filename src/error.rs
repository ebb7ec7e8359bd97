//! Error types for Daun.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for Daun operations.
#[derive(Error, Debug)]
pub enum DaunError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Corpus directory not found: {0}")]
    CorpusNotFound(PathBuf),

    #[error("No supported documents found in {0}")]
    EmptyCorpus(PathBuf),

    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error("Index snapshot corrupt: {0}")]
    IndexCorrupt(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Vision classifier error: {0}")]
    Vision(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

/// Result type alias for Daun operations.
pub type Result<T> = std::result::Result<T, DaunError>;
