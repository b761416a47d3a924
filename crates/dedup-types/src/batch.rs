//! Batch request and filter field types.
//!
//! A batch request carries the batch-scoped fields that every accepted
//! message inherits, the acceptance threshold, and the `filter_by` list
//! that scopes the nearest-neighbour search.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DedupError;
use crate::message::Message;
use crate::record::StoredRecord;

/// Fields a batch may filter its neighbour search on.
///
/// The set is closed: an unknown name fails deserialization instead of
/// silently widening or narrowing the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    /// Batch topic
    Topic,
    /// Batch industry
    Industry,
    /// Batch subindustry
    Subindustry,
    /// Owning job id
    JobId,
}

/// `filter_by` used when the request omits it or sends an empty list.
pub const DEFAULT_FILTER_BY: [FilterField; 2] = [FilterField::Topic, FilterField::Subindustry];

impl FilterField {
    /// Every filterable field, in column order.
    pub const ALL: [FilterField; 4] = [
        FilterField::Topic,
        FilterField::Industry,
        FilterField::Subindustry,
        FilterField::JobId,
    ];

    /// Wire name, which is also the store column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Topic => "topic",
            FilterField::Industry => "industry",
            FilterField::Subindustry => "subindustry",
            FilterField::JobId => "job_id",
        }
    }

    /// Value of this field on a batch request.
    pub fn request_value<'a>(&self, request: &'a BatchRequest) -> &'a str {
        match self {
            FilterField::Topic => &request.topic,
            FilterField::Industry => &request.industry,
            FilterField::Subindustry => &request.subindustry,
            FilterField::JobId => &request.job_id,
        }
    }

    /// Value of this field on a stored record.
    pub fn record_value<'a>(&self, record: &'a StoredRecord) -> &'a str {
        match self {
            FilterField::Topic => &record.topic,
            FilterField::Industry => &record.industry,
            FilterField::Subindustry => &record.subindustry,
            FilterField::JobId => &record.job_id,
        }
    }

    /// Exact equality, the only comparison a filter field supports.
    pub fn matches(&self, record: &StoredRecord, expected: &str) -> bool {
        self.record_value(record) == expected
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = DedupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                DedupError::InvalidInput(format!(
                    "unknown filter field '{}', expected one of topic, industry, subindustry, job_id",
                    s
                ))
            })
    }
}

/// A batch of candidate messages plus the fields every accepted message inherits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Store table the batch is deduplicated against and written to
    pub table_name: String,

    /// Job that produced the batch
    pub job_id: String,

    /// Batch topic
    pub topic: String,

    /// Batch industry
    pub industry: String,

    /// Batch subindustry (optional on the wire)
    #[serde(default)]
    pub subindustry: String,

    /// Candidates scoring at or above this similarity are rejected.
    /// Not range checked.
    pub similarity_threshold: f32,

    /// Fields that scope the neighbour search. See [`BatchRequest::resolved_filter_by`].
    #[serde(default)]
    pub filter_by: Option<Vec<FilterField>>,

    /// Candidate messages in submission order
    pub messages: Vec<Message>,
}

impl BatchRequest {
    /// Create a request with the default `filter_by`.
    pub fn new(
        table_name: impl Into<String>,
        job_id: impl Into<String>,
        topic: impl Into<String>,
        industry: impl Into<String>,
        similarity_threshold: f32,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            job_id: job_id.into(),
            topic: topic.into(),
            industry: industry.into(),
            subindustry: String::new(),
            similarity_threshold,
            filter_by: None,
            messages,
        }
    }

    /// Set the subindustry.
    pub fn with_subindustry(mut self, subindustry: impl Into<String>) -> Self {
        self.subindustry = subindustry.into();
        self
    }

    /// Set an explicit `filter_by`.
    pub fn with_filter_by(mut self, fields: Vec<FilterField>) -> Self {
        self.filter_by = Some(fields);
        self
    }

    /// `filter_by` after defaulting.
    ///
    /// Absent or empty lists resolve to [`DEFAULT_FILTER_BY`]. Repeated
    /// fields keep their first position. Never empty.
    pub fn resolved_filter_by(&self) -> Vec<FilterField> {
        let requested = match &self.filter_by {
            Some(fields) if !fields.is_empty() => fields.as_slice(),
            _ => &DEFAULT_FILTER_BY[..],
        };
        let mut resolved = Vec::with_capacity(requested.len());
        for field in requested {
            if !resolved.contains(field) {
                resolved.push(*field);
            }
        }
        resolved
    }

    /// Check the fields the store layer relies on.
    pub fn validate(&self) -> Result<(), DedupError> {
        if self.table_name.trim().is_empty() {
            return Err(DedupError::InvalidInput(
                "table_name must not be empty".to_string(),
            ));
        }
        if !self.similarity_threshold.is_finite() {
            return Err(DedupError::InvalidInput(format!(
                "similarity_threshold must be a finite number, got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}
