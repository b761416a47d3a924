//! Batch failure type.

use thiserror::Error;

use dedup_embeddings::EmbeddingError;
use dedup_store::StoreError;
use dedup_types::DedupError;

/// Why a batch was aborted. Every variant is fatal to the whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Request rejected before any side effect
    #[error("Invalid batch request: {0}")]
    InvalidRequest(#[from] DedupError),

    /// Embedding provider failed or returned unusable output
    #[error("Embedding provider failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Nearest-neighbour query or insert failed
    #[error("Vector store failed: {0}")]
    Store(#[from] StoreError),
}
