//! Batch orchestrator.
//!
//! Runs one batch end to end: validate, exact-match filter, then for each
//! embedding chunk gate and write its messages in submission order. Any
//! stage failure aborts the batch; rows already written stay written.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};
use ulid::Ulid;

use dedup_embeddings::EmbeddingProvider;
use dedup_store::{FilterPredicate, VectorStore};
use dedup_types::{AcceptedMessage, BatchReport, BatchRequest, BatchResponse, BatchStats};

use crate::batcher::EmbeddingBatcher;
use crate::error::BatchError;
use crate::exact::retain_first_occurrences;
use crate::gate::{GateDecision, SimilarityGate};
use crate::writer::IncrementalWriter;

/// Drives the dedup pipeline for one batch at a time.
///
/// Holds no per-batch state, so one instance can serve many batches.
#[derive(Clone)]
pub struct BatchDeduplicator {
    batcher: EmbeddingBatcher,
    gate: SimilarityGate,
    writer: IncrementalWriter,
}

impl BatchDeduplicator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            batcher: EmbeddingBatcher::new(provider),
            gate: SimilarityGate::new(store.clone()),
            writer: IncrementalWriter::new(store),
        }
    }

    /// Embed in smaller chunks than the default 100.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.batcher = self.batcher.with_chunk_size(chunk_size);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.batcher.chunk_size()
    }

    /// Deduplicate a batch and report what was inserted.
    pub async fn run(&self, request: &BatchRequest) -> Result<BatchReport, BatchError> {
        let span = info_span!(
            "dedup_batch",
            run_id = %Ulid::new(),
            job_id = %request.job_id,
            table = %request.table_name,
        );
        async {
            self.process(request).await.inspect_err(|e| {
                error!(error = %e, "Batch aborted");
            })
        }
        .instrument(span)
        .await
    }

    /// Like [`run`](Self::run), but folds failures into the generic error
    /// response. The cause is only logged.
    pub async fn respond(&self, request: &BatchRequest) -> BatchResponse {
        match self.run(request).await {
            Ok(report) => BatchResponse::Success(report),
            Err(_) => BatchResponse::failed(),
        }
    }

    async fn process(&self, request: &BatchRequest) -> Result<BatchReport, BatchError> {
        request.validate()?;

        let received = request.messages.len();
        let filter_by = request.resolved_filter_by();
        let predicate = FilterPredicate::for_request(request);

        let unique = retain_first_occurrences(&request.messages);
        let exact_duplicates = received - unique.len();
        info!(
            received,
            unique = unique.len(),
            threshold = request.similarity_threshold,
            "Starting batch"
        );

        let mut near_duplicates = 0;
        let mut accepted = Vec::new();
        for (index, chunk) in unique.chunks(self.batcher.chunk_size()).enumerate() {
            let embeddings = self.batcher.embed_chunk(chunk).await?;
            debug!(chunk = index, size = chunk.len(), "Embedded chunk");

            for (message, embedding) in chunk.iter().zip(&embeddings) {
                let decision = self
                    .gate
                    .evaluate(
                        &request.table_name,
                        &predicate,
                        embedding,
                        request.similarity_threshold,
                    )
                    .await?;
                match decision {
                    GateDecision::Accept { similarity } => {
                        self.writer
                            .write(request, message, embedding, similarity)
                            .await?;
                        accepted.push(AcceptedMessage {
                            message_id: message.message_id.clone(),
                            content: message.content.clone(),
                        });
                    }
                    GateDecision::Reject {
                        similarity,
                        neighbor,
                    } => {
                        near_duplicates += 1;
                        debug!(
                            message_id = %message.message_id,
                            duplicate_of = %neighbor.message_id,
                            similarity,
                            "Dropped near duplicate"
                        );
                    }
                }
            }
        }

        let stats = BatchStats::new(received, exact_duplicates, near_duplicates);
        info!(
            inserted = stats.inserted,
            dropped = stats.dropped,
            exact = stats.exact_duplicates,
            near = stats.near_duplicates,
            "Batch complete"
        );
        Ok(BatchReport::new(request, filter_by, stats, accepted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dedup_embeddings::MockEmbedder;
    use dedup_store::InMemoryStore;
    use dedup_types::{FilterField, Message};

    fn messages(contents: &[&str]) -> Vec<Message> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| Message::new(format!("m{i}"), Utc::now(), *c))
            .collect()
    }

    fn request(threshold: f32, batch: Vec<Message>) -> BatchRequest {
        BatchRequest::new("messages", "job-1", "pricing", "retail", threshold, batch)
            .with_subindustry("grocery")
    }

    fn accepted_ids(report: &BatchReport) -> Vec<&str> {
        report
            .accepted_messages
            .iter()
            .map(|m| m.message_id.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_exact_and_near_duplicates() {
        let embedder = Arc::new(
            MockEmbedder::new(3)
                .with_vector("A", vec![1.0, 0.0, 0.0])
                .with_vector("A!", vec![0.99, 0.05, 0.0])
                .with_vector("B", vec![0.0, 1.0, 0.0]),
        );
        let store = Arc::new(InMemoryStore::new());
        let dedup = BatchDeduplicator::new(embedder.clone(), store.clone());

        let report = dedup
            .run(&request(0.9, messages(&["A", "A", "A!", "B"])))
            .await
            .unwrap();

        assert_eq!(accepted_ids(&report), vec!["m0", "m3"]);
        assert_eq!(report.stats.received, 4);
        assert_eq!(report.stats.inserted, 2);
        assert_eq!(report.stats.exact_duplicates, 1);
        assert_eq!(report.stats.near_duplicates, 1);
        assert_eq!(report.stats.insertion_rate, 0.5);
        assert_eq!(report.filter_by, vec![FilterField::Topic, FilterField::Subindustry]);
        assert_eq!(embedder.call_sizes(), vec![3]);
        assert_eq!(store.len("messages"), 2);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_calls() {
        let embedder = Arc::new(MockEmbedder::new(8));
        let store = Arc::new(InMemoryStore::new());
        let dedup = BatchDeduplicator::new(embedder.clone(), store.clone());

        let report = dedup.run(&request(0.9, Vec::new())).await.unwrap();
        assert_eq!(report.stats.received, 0);
        assert_eq!(report.stats.insertion_rate, 0.0);
        assert!(report.accepted_messages.is_empty());
        assert_eq!(embedder.calls(), 0);
        assert!(store.is_empty("messages"));
    }

    #[tokio::test]
    async fn test_chunking_follows_chunk_size() {
        let embedder = Arc::new(MockEmbedder::new(32));
        let store = Arc::new(InMemoryStore::new());
        let dedup = BatchDeduplicator::new(embedder.clone(), store).with_chunk_size(2);

        let report = dedup
            .run(&request(0.99, messages(&["a", "b", "c", "d", "e"])))
            .await
            .unwrap();
        assert_eq!(embedder.call_sizes(), vec![2, 2, 1]);
        assert_eq!(report.stats.inserted, 5);
    }

    #[tokio::test]
    async fn test_invalid_request_has_no_side_effects() {
        let embedder = Arc::new(MockEmbedder::new(8));
        let store = Arc::new(InMemoryStore::new());
        let dedup = BatchDeduplicator::new(embedder.clone(), store.clone());

        let mut bad = request(0.9, messages(&["a"]));
        bad.table_name = "  ".to_string();
        let err = dedup.run(&bad).await.unwrap_err();
        assert!(matches!(err, BatchError::InvalidRequest(_)));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_respond_hides_cause() {
        let embedder = Arc::new(MockEmbedder::new(8));
        let store = Arc::new(InMemoryStore::new());
        let dedup = BatchDeduplicator::new(embedder, store);

        let mut bad = request(0.9, messages(&["a"]));
        bad.table_name = String::new();
        assert_eq!(dedup.respond(&bad).await, BatchResponse::failed());

        let ok = dedup.respond(&request(0.9, messages(&["a"]))).await;
        assert!(ok.is_success());
    }
}
