//! Batch response payload.

use serde::{Deserialize, Serialize};

use crate::batch::{BatchRequest, FilterField};
use crate::stats::BatchStats;

/// Accepted message as echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedMessage {
    pub message_id: String,
    pub content: String,
}

/// Result of a completed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Human-readable summary
    pub message: String,
    pub table_name: String,
    pub job_id: String,
    pub topic: String,
    pub industry: String,
    pub subindustry: String,
    /// `filter_by` after defaulting
    pub filter_by: Vec<FilterField>,
    pub stats: BatchStats,
    /// Accepted messages in submission order
    pub accepted_messages: Vec<AcceptedMessage>,
}

impl BatchReport {
    /// Assemble the report for a finished batch.
    pub fn new(
        request: &BatchRequest,
        filter_by: Vec<FilterField>,
        stats: BatchStats,
        accepted_messages: Vec<AcceptedMessage>,
    ) -> Self {
        let message = format!(
            "Inserted {} of {} messages into {}",
            stats.inserted, stats.received, request.table_name
        );
        Self {
            message,
            table_name: request.table_name.clone(),
            job_id: request.job_id.clone(),
            topic: request.topic.clone(),
            industry: request.industry.clone(),
            subindustry: request.subindustry.clone(),
            filter_by,
            stats,
            accepted_messages,
        }
    }
}

/// Response for one batch, discriminated by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchResponse {
    /// The batch ran to completion
    Success(BatchReport),
    /// The batch was aborted; details are only logged
    Error { message: String },
}

impl BatchResponse {
    /// Generic failure response. The cause is never echoed to the caller.
    pub fn failed() -> Self {
        BatchResponse::Error {
            message: "Batch deduplication failed; resubmit the batch".to_string(),
        }
    }

    /// Whether the batch succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, BatchResponse::Success(_))
    }
}
