//! Error types for the Extractor

use lectern_llm::GenerationError;
use thiserror::Error;

/// Errors that can occur while producing study material
///
/// Relevance extraction and response recovery never fail; only the upstream
/// call and configuration can.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Upstream generation failed with a non-recoverable error
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// Whether the failure came from caller cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExtractorError::Generation(GenerationError::Cancelled))
    }
}
