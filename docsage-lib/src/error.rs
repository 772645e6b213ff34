//! Error types for docsage

use thiserror::Error;

/// Result type alias for docsage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in docsage operations
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to fetch or extract text from a source URL
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The embedding capability failed or returned an unusable vector
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A query arrived while the knowledge base holds no documents
    #[error("knowledge base is empty: check that URLs scraped properly and embeddings succeeded")]
    EmptyKnowledgeBase,

    /// The completion capability failed
    #[error("completion error: {0}")]
    Completion(String),

    /// A vector did not have the index dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Failed to encode or decode a persisted artifact
    #[error("store error: {0}")]
    Store(String),

    /// Configuration could not be read or is invalid
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
