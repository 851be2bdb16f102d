//! Sync error record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One failed sync step for an entity. Appended, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncError {
    pub entity_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl SyncError {
    /// Create an error stamped with the current time.
    pub fn now(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
