//! Incremental writer.

use std::sync::Arc;

use dedup_embeddings::Embedding;
use dedup_store::{StoreError, VectorStore};
use dedup_types::{BatchRequest, Message, StoredRecord};

/// Persists accepted messages one at a time.
///
/// `write` returns only once the store has committed the row, so the next
/// gate lookup in the same batch sees it.
#[derive(Clone)]
pub struct IncrementalWriter {
    store: Arc<dyn VectorStore>,
}

impl IncrementalWriter {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Build the record for an accepted message and insert it.
    pub async fn write(
        &self,
        request: &BatchRequest,
        message: &Message,
        embedding: &Embedding,
        similarity: f32,
    ) -> Result<StoredRecord, StoreError> {
        let record = StoredRecord::accepted(request, message, embedding.values.clone(), similarity);
        self.store.insert(&request.table_name, &record).await?;
        Ok(record)
    }
}
