//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Transport-level failure (connect, timeout, body)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Provider answered 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response body could not be used
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Provider returned a different number of vectors than inputs
    #[error("Provider returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EmbeddingError::InvalidResponse(err.to_string())
        } else {
            EmbeddingError::Http(err.to_string())
        }
    }
}
