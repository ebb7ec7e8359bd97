//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::DaunError;
use crate::index::{SimilarityMetric, VectorIndex};
use crate::rag::Retriever;
use anyhow::Result;
use std::sync::Arc;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'daun doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));

    let metric: SimilarityMetric = settings.index.metric.parse().map_err(DaunError::Config)?;
    let index = VectorIndex::load(&settings.snapshot_path(), embedder.dimensions(), metric)?;
    let retriever = Retriever::new(Arc::new(index), embedder);

    let spinner = Output::spinner("Searching...");
    let results = retriever.retrieve(query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(passages) => {
            if passages.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} passages", passages.len()));
                for passage in &passages {
                    Output::passage(&passage.source, passage.score, &passage.text);
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
