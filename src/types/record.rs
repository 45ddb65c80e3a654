//! Feeding record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single logged feeding event, as persisted in the record log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingRecord {
    /// Store-assigned id, strictly increasing in insertion order
    pub id: u64,
    pub bird_type: String,
    pub food_type: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Insertion time, assigned by the store
    pub created_at: DateTime<Utc>,
}

impl FeedingRecord {
    /// Parse a record from a single log line
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Serialize the record to a single log line (no trailing newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Caller-supplied fields of a feeding record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeeding {
    pub bird_type: String,
    pub food_type: String,
    pub quantity: f64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewFeeding {
    pub fn new(bird_type: impl Into<String>, food_type: impl Into<String>, quantity: f64) -> Self {
        Self {
            bird_type: bird_type.into(),
            food_type: food_type.into(),
            quantity,
            location: None,
            notes: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Subset of records handed to an analysis
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFilter {
    /// Only records for this bird type (case-insensitive)
    #[serde(default)]
    pub bird_type: Option<String>,
    /// Only records for this food type (case-insensitive)
    #[serde(default)]
    pub food_type: Option<String>,
    /// Only the most recent `limit` matching records
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RecordFilter {
    /// Check whether a record passes the type filters (limit is applied separately)
    pub fn matches(&self, record: &FeedingRecord) -> bool {
        let bird_ok = self
            .bird_type
            .as_deref()
            .map_or(true, |b| record.bird_type.eq_ignore_ascii_case(b));
        let food_ok = self
            .food_type
            .as_deref()
            .map_or(true, |f| record.food_type.eq_ignore_ascii_case(f));
        bird_ok && food_ok
    }

    /// Apply the filter to an ordered record sequence, keeping insertion order
    pub fn apply(&self, records: Vec<FeedingRecord>) -> Vec<FeedingRecord> {
        let mut matching: Vec<FeedingRecord> =
            records.into_iter().filter(|r| self.matches(r)).collect();

        if let Some(limit) = self.limit {
            let skip = matching.len().saturating_sub(limit);
            matching.drain(..skip);
        }

        matching
    }
}
