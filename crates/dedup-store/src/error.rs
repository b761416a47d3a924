//! Vector store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Postgres error (connectivity, SQL, constraint)
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// Query vector or record width differs from the stored column width
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Column width that pgvector cannot hold
    #[error("Invalid vector dimension: {0}")]
    InvalidDimension(usize),

    /// Empty or otherwise unusable schema/table name
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// In-memory store lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    LockPoisoned,
}
