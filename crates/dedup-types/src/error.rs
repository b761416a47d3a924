//! Error types for the message-dedup system.

use thiserror::Error;

/// Unified error type for request and settings handling.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
