//! Graph store seam.

use async_trait::async_trait;
use serde::Serialize;

use crate::entity::model::ExternalRecordId;
use crate::error::GsyncResult;
use crate::mapping::model::{MappedData, RelatedMapping};

/// One synchronization instruction: the projection of an entity as one
/// record type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsertInstruction {
    pub entity_id: String,
    pub record_type: String,
    pub fields: MappedData,
    pub related: RelatedMapping,
}

/// Performs writes against the graph database.
///
/// Upserts must be idempotent: submitting the same instruction twice leaves
/// the same record and returns the same id. Retry policy, if any, lives in the
/// implementation.
#[async_trait]
pub trait GraphStoreAdapter: Send + Sync {
    /// Create or update the record for an instruction; returns its id.
    async fn upsert(&self, instruction: &UpsertInstruction) -> GsyncResult<ExternalRecordId>;

    /// Remove a record by id.
    async fn delete(&self, external_id: &ExternalRecordId) -> GsyncResult<()>;
}

/// Record id the graph store assigns to `entity_id` synced as `record_type`.
pub fn record_id(record_type: &str, key: &str) -> ExternalRecordId {
    ExternalRecordId::new(format!("{}:{}", record_type, key))
}
