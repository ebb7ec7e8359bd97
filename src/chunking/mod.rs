//! Character-based chunking for breaking documents into retrievable passages.
//!
//! Split boundary policy: each chunk covers at most `chunk_size` characters;
//! the split point prefers the last paragraph break in the back half of the
//! window, then the last sentence end, then any line break, then a hard
//! cutoff. Every chunk after
//! the first begins exactly `chunk_overlap` characters before the previous
//! chunk's end, so local context survives chunk boundaries. The same policy
//! is used for every build; re-indexing with different settings requires a
//! full rebuild.

use crate::corpus::SourceDocument;
use crate::error::{DaunError, Result};

/// A text passage extracted from a source document.
#[derive(Debug, Clone)]
pub struct TextChunk {
    /// File name of the originating document.
    pub source: String,
    /// Passage text.
    pub content: String,
    /// Order of this chunk within its document.
    pub order: i32,
}

/// Configuration for the character chunker.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared with the previous chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// Splits document text into overlapping fixed-size passages.
pub struct CharacterChunker {
    config: ChunkerConfig,
}

impl CharacterChunker {
    /// Create a chunker, validating that the overlap is smaller than the chunk size.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(DaunError::Config("chunk_size must be positive".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(DaunError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    /// Chunk a whole corpus, preserving document order.
    pub fn chunk_all(&self, documents: &[SourceDocument]) -> Vec<TextChunk> {
        documents
            .iter()
            .flat_map(|doc| self.chunk_document(doc))
            .collect()
    }

    /// Chunk one document. Pages are joined with a blank line first, so
    /// overlap runs across page boundaries.
    pub fn chunk_document(&self, document: &SourceDocument) -> Vec<TextChunk> {
        self.chunk_text(&document.source, &document.text())
    }

    /// Chunk raw text attributed to a source.
    ///
    /// Lengths are counted in Unicode scalar values, never bytes. A text
    /// shorter than `chunk_size` produces exactly one chunk with no overlap.
    pub fn chunk_text(&self, source: &str, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        if total == 0 {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;
        let mut order = 0i32;

        loop {
            let end = if total - start <= self.config.chunk_size {
                total
            } else {
                start + self.split_point(&chars[start..start + self.config.chunk_size])
            };

            chunks.push(TextChunk {
                source: source.to_string(),
                content: chars[start..end].iter().collect(),
                order,
            });
            order += 1;

            if end == total {
                break;
            }
            start = end - self.config.chunk_overlap;
        }

        chunks
    }

    /// Pick a split point within a full-size window of characters.
    ///
    /// Returns a length in `(floor, chunk_size]` where `floor` keeps chunks
    /// from shrinking below half the target size and guarantees forward
    /// progress past the overlap.
    fn split_point(&self, window: &[char]) -> usize {
        let floor = (self.config.chunk_size / 2).max(self.config.chunk_overlap + 1);

        // Prefer the last paragraph break.
        for i in (floor..window.len()).rev() {
            if window[i] == '\n' && window[i - 1] == '\n' {
                return i + 1;
            }
        }

        // Then the last sentence end.
        for i in (floor..window.len()).rev() {
            let c = window[i - 1];
            if (c == '.' || c == '!' || c == '?') && window[i].is_whitespace() {
                return i;
            }
        }

        // Then any line break.
        for i in (floor..window.len()).rev() {
            if window[i] == '\n' {
                return i + 1;
            }
        }

        // Hard cutoff.
        window.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> CharacterChunker {
        CharacterChunker::new(ChunkerConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .unwrap()
    }

    /// Unbroken text with no split boundaries, forcing hard cutoffs.
    fn plain_text(len: usize) -> String {
        ('a'..='z').cycle().take(len).collect()
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let err = CharacterChunker::new(ChunkerConfig {
            chunk_size: 100,
            chunk_overlap: 100,
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_short_document_is_a_single_chunk() {
        let chunks = chunker(1000, 100).chunk_text("doc.pdf", &plain_text(500));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content.chars().count(), 500);
        assert_eq!(chunks[0].order, 0);
    }

    #[test]
    fn test_reference_chunk_counts() {
        // 1200, 500, and 2500 characters with L=1000, O=100.
        let c = chunker(1000, 100);
        assert_eq!(c.chunk_text("doc1", &plain_text(1200)).len(), 2);
        assert_eq!(c.chunk_text("doc2", &plain_text(500)).len(), 1);
        assert_eq!(c.chunk_text("doc3", &plain_text(2500)).len(), 3);
    }

    #[test]
    fn test_chunks_overlap_by_configured_amount() {
        let c = chunker(1000, 100);
        let chunks = c.chunk_text("doc", &plain_text(2500));
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].content.chars().collect();
            let next: Vec<char> = pair[1].content.chars().collect();
            assert_eq!(&prev[prev.len() - 100..], &next[..100]);
        }
    }

    #[test]
    fn test_coverage_reconstructs_original_text() {
        let text = format!(
            "{}\n\n{}\n\n{}",
            plain_text(900),
            plain_text(1100),
            plain_text(700)
        );
        let c = chunker(1000, 100);
        let chunks = c.chunk_text("doc", &text);
        assert!(chunks.len() > 1);

        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                rebuilt.push_str(&chunk.content);
            } else {
                rebuilt.extend(chunk.content.chars().skip(100));
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_prefers_paragraph_boundary() {
        // A paragraph break near the end of the window should win over a
        // hard cutoff at exactly chunk_size.
        let text = format!("{}\n\n{}", plain_text(800), plain_text(600));
        let chunks = chunker(1000, 100).chunk_text("doc", &text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.ends_with("\n\n"));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text: String = std::iter::repeat('é').take(1200).collect();
        let chunks = chunker(1000, 100).chunk_text("doc", &text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content.chars().count(), 1000);
    }

    #[test]
    fn test_chunk_all_preserves_source_association() {
        let docs = vec![
            SourceDocument {
                source: "a.pdf".to_string(),
                pages: vec![plain_text(1200)],
            },
            SourceDocument {
                source: "b.pdf".to_string(),
                pages: vec![plain_text(300)],
            },
        ];
        let chunks = chunker(1000, 100).chunk_all(&docs);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[..2].iter().all(|c| c.source == "a.pdf"));
        assert_eq!(chunks[2].source, "b.pdf");
        assert_eq!(chunks[2].order, 0);
    }
}
