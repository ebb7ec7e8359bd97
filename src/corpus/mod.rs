//! Corpus loading for the offline indexing pipeline.
//!
//! Reads a directory of source documents into plain-text page records.

mod pdf;

use crate::error::{DaunError, Result};
use std::path::Path;
use tracing::{debug, warn};

/// File extensions the loader recognizes.
const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

/// A source document loaded from the corpus directory.
///
/// PDFs contribute one page per text unit; plain-text files are a single unit.
/// Discarded after chunking.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File name of the originating document.
    pub source: String,
    /// Ordered raw text units (pages for PDFs).
    pub pages: Vec<String>,
}

impl SourceDocument {
    /// Full document text: pages joined with a blank line.
    ///
    /// This joined form is what the chunker operates on, so chunk overlap
    /// runs across page boundaries.
    pub fn text(&self) -> String {
        self.pages.join("\n\n")
    }
}

/// Whether a directory entry is a file the loader can read.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load all supported documents from a corpus directory.
///
/// The scan is non-recursive and entries are sorted by file name, so the
/// resulting document order is deterministic. A missing directory is an
/// error; an existing directory with no supported files yields an empty
/// vector, which callers must treat as a signal to abort index building.
pub fn load_corpus(dir: &Path) -> Result<Vec<SourceDocument>> {
    if !dir.is_dir() {
        return Err(DaunError::CorpusNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let doc = load_document(&path)?;
        if doc.pages.iter().all(|p| p.trim().is_empty()) {
            warn!("Skipping document with no extractable text: {}", path.display());
            continue;
        }
        debug!("Loaded {} ({} pages)", doc.source, doc.pages.len());
        documents.push(doc);
    }

    Ok(documents)
}

/// Load a single document.
fn load_document(path: &Path) -> Result<SourceDocument> {
    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let pages = match extension.as_str() {
        "pdf" => pdf::extract_pages(path)?,
        _ => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| DaunError::DocumentLoad(format!("{}: {}", path.display(), e)))?;
            vec![content]
        }
    };

    Ok(SourceDocument { source, pages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_supported() {
        assert!(is_supported(&PathBuf::from("journal.pdf")));
        assert!(is_supported(&PathBuf::from("notes.TXT")));
        assert!(is_supported(&PathBuf::from("readme.md")));
        assert!(!is_supported(&PathBuf::from("image.png")));
        assert!(!is_supported(&PathBuf::from("noextension")));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let err = load_corpus(&PathBuf::from("/nonexistent/corpus/dir")).unwrap_err();
        assert!(matches!(err, crate::error::DaunError::CorpusNotFound(_)));
    }

    #[test]
    fn test_empty_directory_yields_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("photo.png"), b"not text").unwrap();
        let docs = load_corpus(dir.path()).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_documents_sorted_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "second document").unwrap();
        std::fs::write(dir.path().join("a.txt"), "first document").unwrap();

        let docs = load_corpus(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source, "a.txt");
        assert_eq!(docs[1].source, "b.txt");
    }

    #[test]
    fn test_joined_text_separates_pages() {
        let doc = SourceDocument {
            source: "j.pdf".to_string(),
            pages: vec!["page one".to_string(), "page two".to_string()],
        };
        assert_eq!(doc.text(), "page one\n\npage two");
    }
}
