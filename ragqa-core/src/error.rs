//! Error types for the `ragqa-core` crate.

use thiserror::Error;

/// Errors that can occur while building the index or answering a question.
#[derive(Debug, Error)]
pub enum RagError {
    /// The chunker was misconfigured or handed an empty document.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// The question was empty or whitespace-only.
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    /// The generation capability failed (timeout, quota, transport).
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generator that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A query was issued before the index was built.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Retrieval failed for a reason other than a missing index.
    #[error("Retrieval error: {0}")]
    RetrievalError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    /// Whether this error should end the session rather than just the current turn.
    ///
    /// Chunking and configuration failures happen while the index is being
    /// built, so there is nothing left to answer questions against.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RagError::ChunkingError(_) | RagError::ConfigError(_))
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
