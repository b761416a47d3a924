//! # dedup-service
//!
//! Batch deduplication engine.
//!
//! A batch flows strictly forward through four stages:
//!
//! 1. `exact`: drop within-batch exact content duplicates, first occurrence wins
//! 2. `batcher`: embed the survivors in chunks of at most 100
//! 3. `gate`: per message, nearest-neighbour lookup and threshold decision
//! 4. `writer`: commit each accepted message before the next one is gated
//!
//! `orchestrator::BatchDeduplicator` drives the stages one message at a time
//! and reports the accepted subset with per-batch statistics. Messages are
//! never gated concurrently: a message accepted earlier in the batch must
//! already be stored when a later, similar message is looked up.

pub mod batcher;
pub mod error;
pub mod exact;
pub mod gate;
pub mod orchestrator;
pub mod writer;

pub use batcher::{EmbeddingBatcher, EMBED_CHUNK_SIZE};
pub use error::BatchError;
pub use exact::retain_first_occurrences;
pub use gate::{GateDecision, SimilarityGate};
pub use orchestrator::BatchDeduplicator;
pub use writer::IncrementalWriter;
