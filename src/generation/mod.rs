//! Generative model provider for answer synthesis.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for natural-language completion.
///
/// A single prompt in, the model's raw completion out. Provider failures
/// surface as `Generation` errors and are never retried here.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
