//! Index command - build the vector index from the corpus.

use crate::chunking::{CharacterChunker, ChunkerConfig};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::error::DaunError;
use crate::index::{IndexBuilder, SimilarityMetric};
use anyhow::Result;
use std::sync::Arc;

/// Run the index command.
pub async fn run_index(
    corpus: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    let mut settings = settings;
    if let Some(dir) = corpus {
        settings.corpus.dir = dir;
    }
    if let Some(path) = output {
        settings.index.snapshot_path = path;
    }

    if let Err(e) = preflight::check(Operation::BuildIndex, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'daun doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let embedder = Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));

    let chunker = CharacterChunker::new(ChunkerConfig {
        chunk_size: settings.chunking.chunk_size,
        chunk_overlap: settings.chunking.chunk_overlap,
    })?;

    let metric: SimilarityMetric = settings.index.metric.parse().map_err(DaunError::Config)?;

    let builder = IndexBuilder::new(embedder, chunker, metric);

    Output::info(&format!(
        "Building index from {}",
        settings.corpus_dir().display()
    ));
    let spinner = Output::spinner("Loading, chunking, and embedding documents...");

    match builder
        .build_from_corpus(&settings.corpus_dir(), &settings.snapshot_path())
        .await
    {
        Ok(report) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Indexed {} chunks from {} documents ({} pages)",
                report.chunk_count, report.document_count, report.page_count
            ));
            Output::kv("Snapshot", &settings.snapshot_path().display().to_string());
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Index build failed: {}", e));
            Err(e.into())
        }
    }
}
