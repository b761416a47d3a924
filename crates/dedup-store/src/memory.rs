//! Process-local vector store.
//!
//! Brute-force cosine search over every matching row. Inserts are visible
//! to the next `nearest` call as soon as `insert` returns.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use dedup_embeddings::cosine_similarity;
use dedup_types::StoredRecord;

use crate::error::StoreError;
use crate::predicate::FilterPredicate;
use crate::store::{Neighbor, VectorStore};

/// In-memory store keyed by table name.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, Vec<StoredRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with existing records.
    pub fn with_records(
        self,
        table: &str,
        records: impl IntoIterator<Item = StoredRecord>,
    ) -> Result<Self, StoreError> {
        {
            let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
            tables
                .entry(table.to_string())
                .or_default()
                .extend(records);
        }
        Ok(self)
    }

    /// Number of rows in `table`.
    pub fn len(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Snapshot of the rows in `table`, in insertion order.
    pub fn records(&self, table: &str) -> Vec<StoredRecord> {
        self.tables
            .read()
            .map(|tables| tables.get(table).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Column width of `table`, taken from its first row.
    fn dimension_of(rows: &[StoredRecord]) -> Option<usize> {
        rows.first().map(StoredRecord::dimension)
    }
}

/// Whether `candidate` outranks the current best. NaN (zero-norm) scores
/// sort after every number, as pgvector orders NaN distances last; ties keep
/// the earliest row.
fn ranks_before(candidate: f32, current: f32) -> bool {
    match (candidate.is_nan(), current.is_nan()) {
        (false, true) => true,
        (true, _) => false,
        (false, false) => candidate > current,
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn nearest(
        &self,
        table: &str,
        predicate: &FilterPredicate,
        embedding: &[f32],
    ) -> Result<Option<Neighbor>, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        let Some(rows) = tables.get(table) else {
            return Ok(None);
        };
        if let Some(expected) = Self::dimension_of(rows) {
            if expected != embedding.len() {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }

        let mut best: Option<(&StoredRecord, f32)> = None;
        for row in rows.iter().filter(|row| predicate.matches(row)) {
            let similarity = cosine_similarity(&row.embedding, embedding);
            if best.map_or(true, |(_, top)| ranks_before(similarity, top)) {
                best = Some((row, similarity));
            }
        }

        Ok(best.map(|(row, similarity)| Neighbor {
            message_id: row.message_id.clone(),
            content: row.content.clone(),
            similarity,
        }))
    }

    async fn insert(&self, table: &str, record: &StoredRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let rows = tables.entry(table.to_string()).or_default();
        if let Some(expected) = Self::dimension_of(rows) {
            if expected != record.dimension() {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: record.dimension(),
                });
            }
        }
        rows.push(record.clone());
        debug!(table, message_id = %record.message_id, rows = rows.len(), "Inserted record");
        Ok(())
    }
}
