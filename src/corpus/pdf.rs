//! PDF text extraction.

use crate::error::{DaunError, Result};
use std::path::Path;

/// Extract per-page text from a PDF file.
///
/// Extraction quality depends on the PDF; scanned journals without a text
/// layer produce empty pages, which the loader skips.
pub fn extract_pages(path: &Path) -> Result<Vec<String>> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| DaunError::DocumentLoad(format!("{}: {}", path.display(), e)))?;
    Ok(pages)
}
