//! Full-pipeline E2E tests: exact filter, chunked embedding, similarity
//! gate and incremental writes against the in-memory store.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use dedup_embeddings::MockEmbedder;
use dedup_service::BatchDeduplicator;
use dedup_store::InMemoryStore;
use dedup_types::{AcceptedMessage, BatchResponse, FilterField, StoredRecord};
use e2e_tests::{
    batch_request, create_distinct_messages, create_messages, FailingEmbedder, FailingStore,
    TestHarness, TEST_DIMENSION, TEST_TABLE,
};

#[tokio::test]
async fn test_repeated_content_example() {
    let harness = TestHarness::new();
    let report = harness
        .deduplicator()
        .run(&batch_request(0.9, create_messages(&["A", "A", "B"])))
        .await
        .unwrap();

    assert_eq!(report.stats.received, 3);
    assert_eq!(report.stats.inserted, 2);
    assert_eq!(report.stats.dropped, 1);
    assert_eq!(report.stats.exact_duplicates, 1);
    assert_eq!(
        report.accepted_messages,
        vec![
            AcceptedMessage {
                message_id: "msg-0".to_string(),
                content: "A".to_string(),
            },
            AcceptedMessage {
                message_id: "msg-2".to_string(),
                content: "B".to_string(),
            },
        ]
    );
    assert_eq!(harness.stored_ids(), vec!["msg-0", "msg-2"]);
    assert_eq!(report.message, "Inserted 2 of 3 messages into messages");
}

#[tokio::test]
async fn test_counts_always_balance() {
    let harness = TestHarness::with_embedder(
        MockEmbedder::new(TEST_DIMENSION).with_vector("x", vec![1.0; TEST_DIMENSION]),
    );
    let dedup = harness.deduplicator();

    let batches = [
        create_messages(&[]),
        create_messages(&["x"]),
        create_messages(&["x", "x", "y", "z", "y"]),
        create_distinct_messages(7, "fresh"),
    ];
    for batch in batches {
        let report = dedup.run(&batch_request(0.9, batch)).await.unwrap();
        let stats = report.stats;
        assert_eq!(stats.received, stats.inserted + stats.dropped);
        assert_eq!(stats.dropped, stats.exact_duplicates + stats.near_duplicates);
        let expected_rate = if stats.received == 0 {
            0.0
        } else {
            stats.inserted as f64 / stats.received as f64
        };
        assert_eq!(stats.insertion_rate, expected_rate);
        assert_eq!(report.accepted_messages.len(), stats.inserted);
    }
}

#[tokio::test]
async fn test_sequential_visibility_within_batch() {
    let harness = TestHarness::with_embedder(
        MockEmbedder::new(3)
            .with_vector("prices are up", vec![1.0, 0.0, 0.0])
            .with_vector("prices went up", vec![0.95, 0.1, 0.0]),
    );

    let report = harness
        .deduplicator()
        .run(&batch_request(
            0.9,
            create_messages(&["prices are up", "prices went up"]),
        ))
        .await
        .unwrap();

    assert_eq!(harness.stored_ids(), vec!["msg-0"]);
    assert_eq!(report.stats.near_duplicates, 1);
    assert_eq!(harness.stored()[0].similarity_score, 0.0);
}

#[tokio::test]
async fn test_later_batch_sees_earlier_batch() {
    let harness = TestHarness::new();
    let dedup = harness.deduplicator();

    dedup
        .run(&batch_request(0.9, create_messages(&["stock is low"])))
        .await
        .unwrap();
    let report = dedup
        .run(&batch_request(0.9, create_messages(&["stock is low"])))
        .await
        .unwrap();

    assert_eq!(report.stats.inserted, 0);
    assert_eq!(report.stats.near_duplicates, 1);
    assert_eq!(harness.store.len(TEST_TABLE), 1);
}

#[tokio::test]
async fn test_threshold_equality_rejects() {
    let harness = TestHarness::with_embedder(
        MockEmbedder::new(2)
            .with_vector("first", vec![1.0, 0.0])
            .with_vector("same direction", vec![2.0, 0.0])
            .with_vector("orthogonal", vec![0.0, 1.0]),
    );

    let report = harness
        .deduplicator()
        .run(&batch_request(
            1.0,
            create_messages(&["first", "same direction", "orthogonal"]),
        ))
        .await
        .unwrap();

    assert_eq!(harness.stored_ids(), vec!["msg-0", "msg-2"]);
    assert_eq!(report.stats.near_duplicates, 1);
}

#[tokio::test]
async fn test_filter_scopes_the_search() {
    let harness = TestHarness::with_embedder(
        MockEmbedder::new(2).with_vector("shelves empty", vec![1.0, 0.0]),
    );
    let dedup = harness.deduplicator();

    // Same content stored under another topic.
    let mut other_topic = batch_request(0.9, create_messages(&["shelves empty"]));
    other_topic.topic = "inventory".to_string();
    dedup.run(&other_topic).await.unwrap();

    // Default filter (topic, subindustry) does not see it.
    let report = dedup
        .run(&batch_request(0.9, create_messages(&["shelves empty"])))
        .await
        .unwrap();
    assert_eq!(report.stats.inserted, 1);

    // Filtering on industry only sees both rows.
    let by_industry = batch_request(0.9, create_messages(&["shelves empty"]))
        .with_filter_by(vec![FilterField::Industry]);
    let report = dedup.run(&by_industry).await.unwrap();
    assert_eq!(report.stats.inserted, 0);
    assert_eq!(report.filter_by, vec![FilterField::Industry]);

    assert_eq!(harness.store.len(TEST_TABLE), 2);
}

#[tokio::test]
async fn test_empty_request_field_is_not_filtered() {
    let harness = TestHarness::with_embedder(
        MockEmbedder::new(2).with_vector("late delivery", vec![0.0, 1.0]),
    );
    let dedup = harness.deduplicator();

    let mut seeded = batch_request(0.9, create_messages(&["late delivery"]));
    seeded.subindustry = "bakery".to_string();
    dedup.run(&seeded).await.unwrap();

    // No subindustry on the request: only topic constrains the search.
    let mut unscoped = batch_request(0.9, create_messages(&["late delivery"]));
    unscoped.subindustry = String::new();
    let report = dedup.run(&unscoped).await.unwrap();
    assert_eq!(report.stats.inserted, 0);
}

#[tokio::test]
async fn test_records_carry_batch_fields() {
    let harness = TestHarness::new();
    let mut messages = create_messages(&["checkout broken"]);
    messages[0] = messages[0]
        .clone()
        .with_platform("reddit", "u-9", "p-1", "https://reddit.com/p-1");

    harness
        .deduplicator()
        .run(&batch_request(0.9, messages.clone()))
        .await
        .unwrap();

    let stored = harness.stored();
    assert_eq!(stored.len(), 1);
    let record: &StoredRecord = &stored[0];
    assert_eq!(record.message_id, "msg-0");
    assert_eq!(record.timestamp, messages[0].timestamp);
    assert_eq!(record.job_id, "job-e2e");
    assert_eq!(record.topic, "pricing");
    assert_eq!(record.industry, "retail");
    assert_eq!(record.subindustry, "grocery");
    assert_eq!(record.platform_name, "reddit");
    assert_eq!(record.platform_message_url, "https://reddit.com/p-1");
    assert_eq!(record.embedding.len(), TEST_DIMENSION);
}

#[tokio::test]
async fn test_large_batch_is_chunked_by_hundred() {
    let harness = TestHarness::new();
    let report = harness
        .deduplicator()
        .run(&batch_request(0.9, create_distinct_messages(250, "review")))
        .await
        .unwrap();

    assert_eq!(harness.embedder.call_sizes(), vec![100, 100, 50]);
    assert_eq!(report.stats.inserted, 250);
}

#[tokio::test]
async fn test_provider_failure_keeps_committed_chunk() {
    let store = Arc::new(InMemoryStore::new());
    let embedder = Arc::new(FailingEmbedder::new(MockEmbedder::new(TEST_DIMENSION), 2));
    let dedup = BatchDeduplicator::new(embedder.clone(), store.clone());

    let result = dedup
        .run(&batch_request(0.9, create_distinct_messages(150, "complaint")))
        .await;

    assert!(result.is_err());
    assert_eq!(embedder.calls(), 2);
    let ids: Vec<String> = store
        .records(TEST_TABLE)
        .into_iter()
        .map(|r| r.message_id)
        .collect();
    let expected: Vec<String> = (0..100).map(|i| format!("msg-{i}")).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_store_failure_aborts_batch() {
    let inner = Arc::new(InMemoryStore::new());
    let store = Arc::new(FailingStore::new(inner.clone(), 3));
    let dedup = BatchDeduplicator::new(Arc::new(MockEmbedder::new(TEST_DIMENSION)), store);

    let result = dedup
        .run(&batch_request(0.9, create_distinct_messages(5, "refund")))
        .await;

    assert!(result.is_err());
    assert_eq!(inner.len(TEST_TABLE), 2);
}

#[tokio::test]
async fn test_failure_response_is_generic() {
    let embedder = Arc::new(FailingEmbedder::new(MockEmbedder::new(TEST_DIMENSION), 1));
    let dedup = BatchDeduplicator::new(embedder, Arc::new(InMemoryStore::new()));

    let response = dedup
        .respond(&batch_request(0.9, create_messages(&["anything"])))
        .await;
    assert_eq!(response, BatchResponse::failed());

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "error");
    assert!(!json["message"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_request_json_roundtrip_through_pipeline() {
    let harness = TestHarness::new();
    let request: dedup_types::BatchRequest = serde_json::from_value(serde_json::json!({
        "table_name": TEST_TABLE,
        "job_id": "job-json",
        "topic": "pricing",
        "industry": "retail",
        "similarity_threshold": 0.9,
        "messages": [
            {"message_id": "a", "timestamp": "2024-01-29T12:00:00Z", "content": "hi"},
            {"message_id": "b", "timestamp": "2024-01-29T12:00:01Z", "content": "hi"}
        ]
    }))
    .unwrap();

    let response = harness.deduplicator().respond(&request).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["stats"]["inserted"], 1);
    assert_eq!(json["stats"]["dropped"], 1);
    assert_eq!(json["filter_by"], serde_json::json!(["topic", "subindustry"]));
    assert_eq!(json["accepted_messages"][0]["message_id"], "a");
}

#[tokio::test]
async fn test_empty_job_id_runs_unfiltered_on_job() {
    let harness = TestHarness::new();
    let mut request = batch_request(0.9, create_messages(&["A", "B"]))
        .with_filter_by(vec![FilterField::Topic, FilterField::JobId]);
    request.job_id = String::new();

    let predicate = dedup_store::FilterPredicate::for_request(&request);
    assert_eq!(
        predicate
            .conditions()
            .iter()
            .map(|c| c.field)
            .collect::<Vec<_>>(),
        vec![FilterField::Topic]
    );

    let response = harness.deduplicator().respond(&request).await;
    assert!(response.is_success());
    assert_eq!(harness.stored_ids(), vec!["msg-0", "msg-1"]);
    assert!(harness.stored().iter().all(|r| r.job_id.is_empty()));
}

#[tokio::test]
async fn test_zero_vector_is_dropped_like_pgvector() {
    let harness = TestHarness::with_embedder(
        MockEmbedder::new(2)
            .with_vector("real", vec![1.0, 0.0])
            .with_vector("blank", vec![0.0, 0.0]),
    );

    let report = harness
        .deduplicator()
        .run(&batch_request(0.9, create_messages(&["real", "blank"])))
        .await
        .unwrap();

    assert_eq!(harness.stored_ids(), vec!["msg-0"]);
    assert_eq!(report.stats.near_duplicates, 1);
}
