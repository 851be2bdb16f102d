//! Per-entity sync error log.

pub mod model;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::GsyncResult;
use model::SyncError;

/// Append-only accumulator of sync errors, keyed by entity id.
///
/// Retention is the owner's concern; the sync engine never removes entries.
#[async_trait]
pub trait ErrorLog: Send + Sync {
    /// Append messages for an entity, in order.
    async fn add(&self, entity_id: &str, messages: &[String]) -> GsyncResult<()>;

    /// All errors recorded for an entity, oldest first.
    async fn get(&self, entity_id: &str) -> GsyncResult<Vec<SyncError>>;
}

/// Process-local error log.
#[derive(Default)]
pub struct MemoryErrorLog {
    entries: RwLock<HashMap<String, Vec<SyncError>>>,
}

impl MemoryErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of errors across all entities.
    pub fn total(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl ErrorLog for MemoryErrorLog {
    async fn add(&self, entity_id: &str, messages: &[String]) -> GsyncResult<()> {
        if messages.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let log = entries.entry(entity_id.to_string()).or_default();
        log.extend(messages.iter().map(|m| SyncError::now(entity_id, m.as_str())));
        Ok(())
    }

    async fn get(&self, entity_id: &str) -> GsyncResult<Vec<SyncError>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(entity_id).cloned().unwrap_or_default())
    }
}
