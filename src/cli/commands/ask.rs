//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagPipeline;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    top_k: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let mut settings = settings;
    if let Some(model) = model {
        settings.rag.model = model;
    }
    if let Some(k) = top_k {
        settings.rag.top_k = k;
    }

    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'daun doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = RagPipeline::initialize(&settings)?;

    let spinner = Output::spinner("Searching the knowledge base...");

    match pipeline.answer(question).await {
        Ok(answer) => {
            spinner.finish_and_clear();
            println!("\n{}\n", answer);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    }
}
