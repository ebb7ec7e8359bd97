//! Query-time retrieval against the vector index.

use crate::embedding::Embedder;
use crate::error::{DaunError, Result};
use crate::index::VectorIndex;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default number of passages retrieved per question.
///
/// A larger k improves recall but grows the prompt, which costs latency and
/// API spend; 5 keeps both in check for journal-sized passages.
pub const DEFAULT_TOP_K: usize = 5;

/// A passage returned for a question, in ranked order.
#[derive(Debug, Clone)]
pub struct RetrievedPassage {
    /// File name of the originating document.
    pub source: String,
    /// Passage text.
    pub text: String,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Embeds questions and searches the read-only vector index.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    /// Create a retriever over a loaded index.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// Return the top-k most similar passages for a question.
    ///
    /// The index is never mutated. Embedding or search failures surface as
    /// `Retrieval` errors and fail the whole request.
    #[instrument(skip(self), fields(question = %question, k = k))]
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        let query = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| DaunError::Retrieval(e.to_string()))?;

        let hits = self
            .index
            .search(&query, k)
            .map_err(|e| DaunError::Retrieval(e.to_string()))?;

        debug!("Retrieved {} passages", hits.len());

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedPassage {
                source: hit.source,
                text: hit.text,
                score: hit.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::{FailingEmbedder, FakeEmbedder};
    use crate::index::{IndexEntry, SimilarityMetric};

    async fn index_of(passages: &[&str], embedder: &FakeEmbedder) -> VectorIndex {
        let texts: Vec<String> = passages.iter().map(|p| p.to_string()).collect();
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        let entries = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| IndexEntry::new("journal.pdf".into(), text, embedding))
            .collect();
        VectorIndex::build(entries, SimilarityMetric::Cosine).unwrap()
    }

    #[tokio::test]
    async fn test_leaf_curl_question_retrieves_matching_passage_first() {
        let embedder = FakeEmbedder::new(256);
        let index = index_of(
            &[
                "Powdery mildew thrives in humid greenhouses.",
                "Gemini virus causes leaf curl, transmitted by whitefly.",
                "Aphids excrete honeydew which attracts ants.",
                "Crop rotation reduces soil-borne pathogen pressure.",
            ],
            &embedder,
        )
        .await;

        let retriever = Retriever::new(Arc::new(index), Arc::new(embedder));
        let passages = retriever.retrieve("What causes leaf curl?", 5).await.unwrap();

        assert_eq!(passages.len(), 4);
        assert!(passages[0].text.contains("Gemini virus"));
    }

    #[tokio::test]
    async fn test_retrieve_respects_k() {
        let embedder = FakeEmbedder::new(64);
        let index = index_of(&["one", "two", "three"], &embedder).await;
        let retriever = Retriever::new(Arc::new(index), Arc::new(embedder));

        let passages = retriever.retrieve("two", 2).await.unwrap();
        assert_eq!(passages.len(), 2);
    }

    #[tokio::test]
    async fn test_embedding_failure_maps_to_retrieval_error() {
        let embedder = FakeEmbedder::new(8);
        let index = index_of(&["passage"], &embedder).await;
        let retriever = Retriever::new(Arc::new(index), Arc::new(FailingEmbedder));

        let err = retriever.retrieve("question", 5).await.unwrap_err();
        assert!(matches!(err, DaunError::Retrieval(_)));
    }
}
