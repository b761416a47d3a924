//! Candidate message type.
//!
//! Messages are immutable once received. Their `content` is the dedup key
//! for both the exact-match stage and the embedding stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message submitted for deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Caller-assigned identifier
    pub message_id: String,

    /// When the message was posted on its platform
    pub timestamp: DateTime<Utc>,

    /// Message text; compared byte-for-byte by the exact-match stage
    pub content: String,

    /// Platform the message came from (e.g. "reddit")
    #[serde(default)]
    pub platform_name: String,

    /// Author id on the platform
    #[serde(default)]
    pub platform_user_id: String,

    /// Message id on the platform
    #[serde(default)]
    pub platform_message_id: String,

    /// Permalink on the platform
    #[serde(default)]
    pub platform_message_url: String,
}

impl Message {
    /// Create a message with empty platform provenance.
    pub fn new(
        message_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            timestamp,
            content: content.into(),
            platform_name: String::new(),
            platform_user_id: String::new(),
            platform_message_id: String::new(),
            platform_message_url: String::new(),
        }
    }

    /// Attach platform provenance.
    pub fn with_platform(
        mut self,
        name: impl Into<String>,
        user_id: impl Into<String>,
        message_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.platform_name = name.into();
        self.platform_user_id = user_id.into();
        self.platform_message_id = message_id.into();
        self.platform_message_url = url.into();
        self
    }
}
