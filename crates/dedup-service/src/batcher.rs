//! Embedding batcher.
//!
//! Splits the exact-deduplicated messages into contiguous chunks and makes
//! one provider call per chunk. A failed or malformed chunk aborts the batch.

use std::sync::Arc;

use tracing::debug;

use dedup_embeddings::{Embedding, EmbeddingError, EmbeddingProvider};
use dedup_types::{Message, MAX_EMBED_CHUNK_SIZE};

/// Largest number of messages embedded per provider call.
pub const EMBED_CHUNK_SIZE: usize = MAX_EMBED_CHUNK_SIZE;

/// Chunked access to an embedding provider.
#[derive(Clone)]
pub struct EmbeddingBatcher {
    provider: Arc<dyn EmbeddingProvider>,
    chunk_size: usize,
}

impl EmbeddingBatcher {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            chunk_size: EMBED_CHUNK_SIZE,
        }
    }

    /// Use smaller chunks. Clamped to `1..=EMBED_CHUNK_SIZE`.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, EMBED_CHUNK_SIZE);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Embed one chunk, one vector per message in chunk order.
    pub async fn embed_chunk(&self, chunk: &[&Message]) -> Result<Vec<Embedding>, EmbeddingError> {
        let texts: Vec<String> = chunk.iter().map(|m| m.content.clone()).collect();
        debug!(
            count = texts.len(),
            model = self.provider.model(),
            "Embedding chunk"
        );
        let embeddings = self.provider.embed(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        Ok(embeddings)
    }
}
