//! Mapping output models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name to value, produced fresh for one (entity, record type) pair.
pub type MappedData = BTreeMap<String, Value>;

/// Ordered related-record descriptors for one (entity, record type) pair.
pub type RelatedMapping = Vec<RelatedRecord>;

/// A record linked to the primary graph record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedRecord {
    /// Record type of the linked record.
    pub target_type: String,
    /// Identifying key of the linked record within its type.
    pub target_key: String,
    /// Relation kind from the primary record to the linked record.
    pub relation: String,
}

impl RelatedRecord {
    pub fn new(
        target_type: impl Into<String>,
        target_key: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            target_type: target_type.into(),
            target_key: target_key.into(),
            relation: relation.into(),
        }
    }
}
