//! Error types for the salesbuddy query pipeline
//!
//! Provides error handling with context propagation across the
//! retrieval, reranking, and completion stages.

use thiserror::Error;

/// Main error type for the sales Q&A system
#[derive(Error, Debug)]
pub enum RagError {
    /// Document search collaborator errors
    #[error("Search error: {0}")]
    SearchError(String),

    /// Completion provider errors
    #[error("Completion provider error: {0}")]
    CompletionError(String),

    /// Date filter expressions the search collaborator cannot evaluate
    #[error("Unsupported filter expression: {0}")]
    FilterError(String),

    /// Enrichment join errors (missing or unreadable source data)
    #[error("Enrichment error: {0}")]
    EnrichmentError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;

/// Convert anyhow errors to RagError
impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Generic(err.to_string())
    }
}
