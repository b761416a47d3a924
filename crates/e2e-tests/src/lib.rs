//! End-to-end test infrastructure for message-dedup.
//!
//! Provides a shared TestHarness plus embedders and stores that fail on
//! cue, for driving the full batch pipeline without external services.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use dedup_embeddings::{Embedding, EmbeddingError, EmbeddingProvider, MockEmbedder};
use dedup_service::BatchDeduplicator;
use dedup_store::{FilterPredicate, InMemoryStore, Neighbor, StoreError, VectorStore};
use dedup_types::{BatchRequest, Message, StoredRecord};

/// Table every harness batch targets.
pub const TEST_TABLE: &str = "messages";

/// Dimension of the harness embedder. High enough that unrelated contents
/// land far below any realistic threshold.
pub const TEST_DIMENSION: usize = 64;

/// Shared test harness: one in-memory store, one deterministic embedder.
pub struct TestHarness {
    pub store: Arc<InMemoryStore>,
    pub embedder: Arc<MockEmbedder>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_embedder(MockEmbedder::new(TEST_DIMENSION))
    }

    /// Harness around a prepared embedder, e.g. one with pinned vectors.
    pub fn with_embedder(embedder: MockEmbedder) -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            embedder: Arc::new(embedder),
        }
    }

    pub fn deduplicator(&self) -> BatchDeduplicator {
        BatchDeduplicator::new(self.embedder.clone(), self.store.clone())
    }

    /// Rows currently stored in the test table.
    pub fn stored(&self) -> Vec<StoredRecord> {
        self.store.records(TEST_TABLE)
    }

    pub fn stored_ids(&self) -> Vec<String> {
        self.stored().into_iter().map(|r| r.message_id).collect()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Messages `msg-0..` with the given contents, one second apart.
pub fn create_messages(contents: &[&str]) -> Vec<Message> {
    let base: DateTime<Utc> = Utc
        .with_ymd_and_hms(2024, 1, 29, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    contents
        .iter()
        .enumerate()
        .map(|(i, content)| {
            Message::new(
                format!("msg-{i}"),
                base + Duration::seconds(i as i64),
                *content,
            )
        })
        .collect()
}

/// `count` distinct messages built from `base_text`.
pub fn create_distinct_messages(count: usize, base_text: &str) -> Vec<Message> {
    let contents: Vec<String> = (0..count).map(|i| format!("{base_text} #{i}")).collect();
    let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
    create_messages(&refs)
}

/// Batch against [`TEST_TABLE`] for topic `pricing` in `retail/grocery`.
pub fn batch_request(threshold: f32, messages: Vec<Message>) -> BatchRequest {
    BatchRequest::new(TEST_TABLE, "job-e2e", "pricing", "retail", threshold, messages)
        .with_subindustry("grocery")
}

/// Embedder that delegates to a [`MockEmbedder`] until call `fail_on_call`
/// (1-based), which fails.
pub struct FailingEmbedder {
    inner: MockEmbedder,
    fail_on_call: usize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new(inner: MockEmbedder, fail_on_call: usize) -> Self {
        Self {
            inner,
            fail_on_call,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn model(&self) -> &str {
        "failing-mock"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call {
            return Err(EmbeddingError::Api {
                status: 503,
                body: "model overloaded".to_string(),
            });
        }
        self.inner.embed(texts).await
    }
}

/// Store that delegates to an [`InMemoryStore`] but fails insert number
/// `fail_on_insert` (1-based).
pub struct FailingStore {
    pub inner: Arc<InMemoryStore>,
    fail_on_insert: usize,
    inserts: AtomicUsize,
}

impl FailingStore {
    pub fn new(inner: Arc<InMemoryStore>, fail_on_insert: usize) -> Self {
        Self {
            inner,
            fail_on_insert,
            inserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VectorStore for FailingStore {
    async fn nearest(
        &self,
        table: &str,
        predicate: &FilterPredicate,
        embedding: &[f32],
    ) -> Result<Option<Neighbor>, StoreError> {
        self.inner.nearest(table, predicate, embedding).await
    }

    async fn insert(&self, table: &str, record: &StoredRecord) -> Result<(), StoreError> {
        let insert = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
        if insert == self.fail_on_insert {
            return Err(StoreError::LockPoisoned);
        }
        self.inner.insert(table, record).await
    }
}
