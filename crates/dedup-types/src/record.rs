//! Persisted form of an accepted message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::BatchRequest;
use crate::message::Message;

/// A message accepted by the similarity gate, as written to the store.
///
/// Created exactly once at acceptance time and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub platform_name: String,
    pub platform_user_id: String,
    pub platform_message_id: String,
    pub platform_message_url: String,

    /// Owning batch's job id
    pub job_id: String,
    pub topic: String,
    pub industry: String,
    pub subindustry: String,

    /// Embedding of `content`
    pub embedding: Vec<f32>,

    /// Nearest-neighbour similarity the message was accepted at (0 when the
    /// search found no row)
    pub similarity_score: f32,
}

impl StoredRecord {
    /// Build the record for `message`, inheriting the batch-scoped fields.
    pub fn accepted(
        request: &BatchRequest,
        message: &Message,
        embedding: Vec<f32>,
        similarity_score: f32,
    ) -> Self {
        Self {
            message_id: message.message_id.clone(),
            timestamp: message.timestamp,
            content: message.content.clone(),
            platform_name: message.platform_name.clone(),
            platform_user_id: message.platform_user_id.clone(),
            platform_message_id: message.platform_message_id.clone(),
            platform_message_url: message.platform_message_url.clone(),
            job_id: request.job_id.clone(),
            topic: request.topic.clone(),
            industry: request.industry.clone(),
            subindustry: request.subindustry.clone(),
            embedding,
            similarity_score,
        }
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_inherits_batch_fields() {
        let request = BatchRequest::new("t", "job-3", "shipping", "logistics", 0.9, vec![])
            .with_subindustry("freight");
        let message = Message::new("m-9", Utc::now(), "late delivery again").with_platform(
            "x",
            "u1",
            "p1",
            "https://x.com/p1",
        );

        let record = StoredRecord::accepted(&request, &message, vec![0.1, 0.2, 0.3], 0.42);

        assert_eq!(record.message_id, "m-9");
        assert_eq!(record.content, "late delivery again");
        assert_eq!(record.platform_message_url, "https://x.com/p1");
        assert_eq!(record.job_id, "job-3");
        assert_eq!(record.topic, "shipping");
        assert_eq!(record.industry, "logistics");
        assert_eq!(record.subindustry, "freight");
        assert_eq!(record.dimension(), 3);
        assert!((record.similarity_score - 0.42).abs() < f32::EPSILON);
    }
}
