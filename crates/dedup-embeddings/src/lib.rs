//! # dedup-embeddings
//!
//! Embedding provider clients for message-dedup.
//!
//! The embedding model itself is external. This crate defines the provider
//! seam used by the dedup pipeline and ships two implementations:
//!
//! ## Features
//! - `ApiEmbedder`: Ollama and OpenAI-compatible HTTP endpoints
//! - `MockEmbedder`: deterministic content-hash vectors for offline runs and tests
//! - One vector per input, same order, or an error. No retries.

pub mod api;
pub mod error;
pub mod mock;
pub mod model;

pub use api::{ApiEmbedder, ApiEmbedderConfig};
pub use error::EmbeddingError;
pub use mock::MockEmbedder;
pub use model::{cosine_similarity, Embedding, EmbeddingProvider};
