//! Configuration module for Daun.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{DiagnosisPrompts, Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, CorpusSettings, EmbeddingSettings, GeneralSettings, IndexSettings,
    PromptSettings, RagSettings, Settings, VisionSettings,
};
