//! Vector index for nearest-neighbor retrieval over passage embeddings.
//!
//! The index is built once by the offline Index Builder, persisted as a
//! snapshot, and loaded read-only at service startup. It is never mutated
//! after load, so concurrent searches need no locking.

mod builder;

pub use builder::{BuildReport, IndexBuilder};

use crate::error::{DaunError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// Snapshot layout version. Bumped on incompatible changes.
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Similarity metric, fixed at build time and recorded in the snapshot.
///
/// Both conventions score "higher is better": cosine similarity directly,
/// Euclidean as the negated distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    Cosine,
    Euclidean,
}

impl SimilarityMetric {
    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            SimilarityMetric::Cosine => cosine_similarity(a, b),
            SimilarityMetric::Euclidean => {
                -a.iter()
                    .zip(b.iter())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f32>()
                    .sqrt()
            }
        }
    }
}

impl std::str::FromStr for SimilarityMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(SimilarityMetric::Cosine),
            "euclidean" => Ok(SimilarityMetric::Euclidean),
            _ => Err(format!("Unknown similarity metric: {}", s)),
        }
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMetric::Cosine => write!(f, "cosine"),
            SimilarityMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// A passage paired with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unique entry ID.
    pub id: Uuid,
    /// File name of the originating document.
    pub source: String,
    /// Passage text.
    pub text: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

impl IndexEntry {
    /// Create a new entry.
    pub fn new(source: String, text: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            text,
            embedding,
        }
    }
}

/// Metadata embedded in the snapshot for validation on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub format_version: u32,
    pub dimensions: usize,
    pub metric: SimilarityMetric,
    pub entry_count: usize,
    pub built_at: DateTime<Utc>,
}

/// A search hit: passage text plus its similarity score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub source: String,
    pub text: String,
    pub score: f32,
}

/// Exact nearest-neighbor index over passage embeddings.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    metadata: IndexMetadata,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from embedded passages.
    ///
    /// All entries must share one embedding dimension; a mismatch is a fatal
    /// configuration error.
    pub fn build(entries: Vec<IndexEntry>, metric: SimilarityMetric) -> Result<Self> {
        let dimensions = entries
            .first()
            .map(|e| e.embedding.len())
            .ok_or_else(|| DaunError::InvalidInput("cannot build an empty index".to_string()))?;

        for entry in &entries {
            if entry.embedding.len() != dimensions {
                return Err(DaunError::Config(format!(
                    "Inconsistent embedding dimensions: {} has {}, expected {}",
                    entry.source,
                    entry.embedding.len(),
                    dimensions
                )));
            }
        }

        Ok(Self {
            metadata: IndexMetadata {
                format_version: SNAPSHOT_FORMAT_VERSION,
                dimensions,
                metric,
                entry_count: entries.len(),
                built_at: Utc::now(),
            },
            entries,
        })
    }

    /// Search for the passages nearest to a query vector.
    ///
    /// Returns exactly `min(k, len)` hits ordered by non-increasing score.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.metadata.dimensions {
            return Err(DaunError::InvalidInput(format!(
                "Query vector has {} dimensions, index expects {}",
                query.len(),
                self.metadata.dimensions
            )));
        }

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                source: entry.source.clone(),
                text: entry.text.clone(),
                score: self.metadata.metric.score(query, &entry.embedding),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        Ok(hits)
    }

    /// Number of indexed passages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no passages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot metadata.
    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    /// Persist the index atomically.
    ///
    /// The snapshot is written to a temp file in the target directory and
    /// renamed into place, so a crashed build never leaves a half-written
    /// snapshot behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        serde_json::to_writer(&mut tmp, self)?;
        tmp.flush()?;
        tmp.persist(path)
            .map_err(|e| DaunError::Io(e.error))?;
        Ok(())
    }

    /// Load a persisted index, validating it against the configured
    /// embedding dimensions and similarity metric.
    ///
    /// This check runs at startup, before the first query is ever served.
    /// Any unreadable or inconsistent snapshot refuses to load.
    pub fn load(
        path: &Path,
        expected_dimensions: usize,
        expected_metric: SimilarityMetric,
    ) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DaunError::IndexCorrupt(format!("cannot read snapshot {}: {}", path.display(), e))
        })?;

        let index: VectorIndex = serde_json::from_str(&content).map_err(|e| {
            DaunError::IndexCorrupt(format!("snapshot {} is unreadable: {}", path.display(), e))
        })?;

        if index.metadata.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(DaunError::IndexCorrupt(format!(
                "snapshot format version {} does not match supported version {}",
                index.metadata.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        if index.metadata.dimensions != expected_dimensions {
            return Err(DaunError::IndexCorrupt(format!(
                "snapshot was built with {} dimensions but the embedding provider is configured for {}",
                index.metadata.dimensions, expected_dimensions
            )));
        }

        if index.metadata.metric != expected_metric {
            return Err(DaunError::IndexCorrupt(format!(
                "snapshot was built with metric '{}' but '{}' is configured",
                index.metadata.metric, expected_metric
            )));
        }

        if index.metadata.entry_count != index.entries.len()
            || index
                .entries
                .iter()
                .any(|e| e.embedding.len() != index.metadata.dimensions)
        {
            return Err(DaunError::IndexCorrupt(
                "snapshot entries disagree with its metadata".to_string(),
            ));
        }

        Ok(index)
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VectorIndex {
        VectorIndex::build(
            vec![
                IndexEntry::new("a.pdf".into(), "x axis".into(), vec![1.0, 0.0, 0.0]),
                IndexEntry::new("a.pdf".into(), "y axis".into(), vec![0.0, 1.0, 0.0]),
                IndexEntry::new("b.pdf".into(), "z axis".into(), vec![0.0, 0.0, 1.0]),
            ],
            SimilarityMetric::Cosine,
        )
        .unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_build_rejects_empty_and_mismatched_entries() {
        assert!(VectorIndex::build(Vec::new(), SimilarityMetric::Cosine).is_err());

        let err = VectorIndex::build(
            vec![
                IndexEntry::new("a".into(), "one".into(), vec![1.0, 0.0]),
                IndexEntry::new("a".into(), "two".into(), vec![1.0, 0.0, 0.0]),
            ],
            SimilarityMetric::Cosine,
        )
        .unwrap_err();
        assert!(matches!(err, DaunError::Config(_)));
    }

    #[test]
    fn test_search_k_bound_and_ordering() {
        let index = sample_index();

        // k larger than the index returns everything.
        let hits = index.search(&[1.0, 0.2, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(hits[0].text, "x axis");

        // k smaller than the index returns exactly k.
        let hits = index.search(&[1.0, 0.2, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = sample_index();
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_euclidean_metric_orders_by_distance() {
        let index = VectorIndex::build(
            vec![
                IndexEntry::new("a".into(), "near".into(), vec![1.0, 1.0]),
                IndexEntry::new("a".into(), "far".into(), vec![5.0, 5.0]),
            ],
            SimilarityMetric::Euclidean,
        )
        .unwrap();

        let hits = index.search(&[1.0, 1.2], 2).unwrap();
        assert_eq!(hits[0].text, "near");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_snapshot_round_trip_answers_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let index = sample_index();
        index.save(&path).unwrap();

        let loaded = VectorIndex::load(&path, 3, SimilarityMetric::Cosine).unwrap();
        assert_eq!(loaded.len(), index.len());

        let query = [0.3, 0.9, 0.1];
        for k in 1..=3 {
            let before = index.search(&query, k).unwrap();
            let after = loaded.search(&query, k).unwrap();
            assert_eq!(before.len(), after.len());
            for (b, a) in before.iter().zip(after.iter()) {
                assert_eq!(b.text, a.text);
                assert_eq!(b.score, a.score);
            }
        }
    }

    #[test]
    fn test_load_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        sample_index().save(&path).unwrap();

        // Built with 3 dimensions, loaded against a 1536-dim provider.
        let err = VectorIndex::load(&path, 1536, SimilarityMetric::Cosine).unwrap_err();
        assert!(matches!(err, DaunError::IndexCorrupt(_)));
    }

    #[test]
    fn test_load_rejects_metric_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        sample_index().save(&path).unwrap();

        let err = VectorIndex::load(&path, 3, SimilarityMetric::Euclidean).unwrap_err();
        assert!(matches!(err, DaunError::IndexCorrupt(_)));
    }

    #[test]
    fn test_load_rejects_missing_or_garbage_snapshot() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            VectorIndex::load(&missing, 3, SimilarityMetric::Cosine).unwrap_err(),
            DaunError::IndexCorrupt(_)
        ));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not a snapshot").unwrap();
        assert!(matches!(
            VectorIndex::load(&garbage, 3, SimilarityMetric::Cosine).unwrap_err(),
            DaunError::IndexCorrupt(_)
        ));
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("cosine".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::Cosine);
        assert_eq!(
            "Euclidean".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::Euclidean
        );
        assert!("manhattan".parse::<SimilarityMetric>().is_err());
    }
}
