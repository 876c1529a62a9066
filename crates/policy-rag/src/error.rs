//! Error types for the policy RAG pipeline

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
///
/// Only structural failures surface through these variants. Recoverable
/// conditions (zero retrieval hits, malformed generation output, rejected
/// citations) degrade into result states instead of erroring.
#[derive(Debug, Error)]
pub enum Error {
    /// Uploaded content failed the domain-relevance check. A rejection, not a bug.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Extraction or chunking produced nothing usable. Partial state for the
    /// document is rolled back before this surfaces.
    #[error("ingestion failed: {0}")]
    Ingestion(String),

    /// Persisted state expected on disk is absent. Scorers map this to an
    /// error-marker report instead of propagating it.
    #[error("missing data: {0}")]
    MissingData(String),

    #[error("vector index error: {0}")]
    VectorIndex(String),

    #[error("embedding provider error: {0}")]
    Embedding(String),

    #[error("llm provider error: {0}")]
    Llm(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
