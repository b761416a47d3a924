//! Vector store trait and types.

use async_trait::async_trait;

use dedup_types::StoredRecord;

use crate::error::StoreError;
use crate::predicate::FilterPredicate;

/// Closest stored record to a query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub message_id: String,
    pub content: String,
    /// `1 - cosine distance`
    pub similarity: f32,
}

/// Persistent vector store consulted and extended by the dedup pipeline.
///
/// `insert` must not return before the row is visible to a subsequent
/// `nearest` on the same store.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Nearest record in `table` satisfying `predicate`, ranked by ascending
    /// cosine distance. `None` when no row matches.
    async fn nearest(
        &self,
        table: &str,
        predicate: &FilterPredicate,
        embedding: &[f32],
    ) -> Result<Option<Neighbor>, StoreError>;

    /// Persist one record.
    async fn insert(&self, table: &str, record: &StoredRecord) -> Result<(), StoreError>;
}
