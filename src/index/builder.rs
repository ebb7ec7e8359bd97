//! Offline index construction: load, chunk, embed, persist.

use super::{IndexEntry, SimilarityMetric, VectorIndex};
use crate::chunking::CharacterChunker;
use crate::corpus;
use crate::embedding::Embedder;
use crate::error::{DaunError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Builds the vector index from a corpus directory.
///
/// This is a one-shot batch job with no partial or resumable state: a
/// failure at any stage requires a full rerun. Concurrent builders writing
/// to the same snapshot path must be serialized by the caller.
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    chunker: CharacterChunker,
    metric: SimilarityMetric,
}

/// Summary of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    /// Source documents loaded.
    pub document_count: usize,
    /// Raw text units (PDF pages) across all documents.
    pub page_count: usize,
    /// Passages embedded and indexed.
    pub chunk_count: usize,
}

impl IndexBuilder {
    /// Create a builder from its collaborators.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chunker: CharacterChunker,
        metric: SimilarityMetric,
    ) -> Self {
        Self {
            embedder,
            chunker,
            metric,
        }
    }

    /// Run the full pipeline: load, chunk, embed, build, save.
    ///
    /// An empty corpus aborts with a warning; no snapshot is written.
    #[instrument(skip(self), fields(corpus = %corpus_dir.display()))]
    pub async fn build_from_corpus(
        &self,
        corpus_dir: &Path,
        snapshot_path: &Path,
    ) -> Result<BuildReport> {
        info!("Loading corpus from {}", corpus_dir.display());
        let documents = corpus::load_corpus(corpus_dir)?;
        if documents.is_empty() {
            warn!(
                "No supported documents in {}; refusing to build an empty index",
                corpus_dir.display()
            );
            return Err(DaunError::EmptyCorpus(corpus_dir.to_path_buf()));
        }

        let page_count: usize = documents.iter().map(|d| d.pages.len()).sum();
        info!("Loaded {} documents ({} pages)", documents.len(), page_count);

        let chunks = self.chunker.chunk_all(&documents);
        info!("Split into {} chunks", chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        // Entries pair each chunk with its vector by position; a short batch
        // would silently drop or mispair chunks.
        if embeddings.len() != chunks.len() {
            return Err(DaunError::Embedding(format!(
                "Embedded {} of {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry::new(chunk.source, chunk.content, embedding))
            .collect();

        let index = VectorIndex::build(entries, self.metric)?;
        index.save(snapshot_path)?;
        info!(
            "Index with {} entries saved to {}",
            index.len(),
            snapshot_path.display()
        );

        Ok(BuildReport {
            document_count: documents.len(),
            page_count,
            chunk_count: index.len(),
        })
    }
}
