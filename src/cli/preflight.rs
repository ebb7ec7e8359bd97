//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway or at startup.

use crate::config::Settings;
use crate::error::{DaunError, Result};
use crate::openai;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Index building requires the API key and the corpus directory.
    BuildIndex,
    /// Asking questions requires the API key and a snapshot.
    Ask,
    /// Serving requires the same as asking.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::BuildIndex => {
            openai::require_api_key()?;
            let corpus = settings.corpus_dir();
            if !corpus.is_dir() {
                return Err(DaunError::CorpusNotFound(corpus));
            }
        }
        Operation::Ask | Operation::Serve => {
            openai::require_api_key()?;
            let snapshot = settings.snapshot_path();
            if !snapshot.is_file() {
                return Err(DaunError::Config(format!(
                    "No index snapshot at {}. Run 'daun index' first.",
                    snapshot.display()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_index_requires_corpus_directory() {
        // The key check passes, so the corpus check is what fails.
        let _env = crate::openai::testing::env_lock();
        std::env::set_var("OPENAI_API_KEY", "sk-test");

        let mut settings = Settings::default();
        settings.corpus.dir = "/nonexistent/journals".to_string();

        let err = check(Operation::BuildIndex, &settings).unwrap_err();
        assert!(matches!(err, DaunError::CorpusNotFound(_)));
    }
}
