//! # dedup-types
//!
//! Shared domain types for the message-dedup system.
//!
//! This crate defines the data structures passed between the dedup stages:
//! - Messages: Immutable candidate messages submitted in a batch
//! - Batch requests: Batch-scoped fields, threshold and `filter_by`
//! - Stored records: The persisted form of an accepted message
//! - Stats and responses: What a finished batch reports back
//! - Settings: Configuration types
//!
//! ## Usage
//!
//! ```rust
//! use dedup_types::{BatchRequest, FilterField};
//!
//! let request: BatchRequest = serde_json::from_str(r#"{
//!     "table_name": "messages",
//!     "job_id": "job-1",
//!     "topic": "pricing",
//!     "industry": "retail",
//!     "similarity_threshold": 0.9,
//!     "messages": []
//! }"#).unwrap();
//! assert_eq!(request.resolved_filter_by(), vec![FilterField::Topic, FilterField::Subindustry]);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod message;
pub mod record;
pub mod response;
pub mod stats;

pub use batch::{BatchRequest, FilterField, DEFAULT_FILTER_BY};
pub use crate::config::{
    EmbeddingApi, EmbeddingSettings, Settings, StoreBackend, StoreSettings, MAX_EMBED_CHUNK_SIZE,
};
pub use error::DedupError;
pub use message::Message;
pub use record::StoredRecord;
pub use response::{AcceptedMessage, BatchReport, BatchResponse};
pub use stats::BatchStats;
