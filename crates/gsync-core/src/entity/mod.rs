//! Primary-store entities and their cached metadata.

pub mod model;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::GsyncResult;
use model::Entity;

/// Read access to the identity store plus the metadata slot the sync engine
/// writes back into.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Load the current state of an entity. `Ok(None)` means it does not exist.
    async fn load(&self, entity_id: &str) -> GsyncResult<Option<Entity>>;

    /// Read one metadata value attached to an entity.
    async fn get_metadata(&self, entity_id: &str, key: &str) -> GsyncResult<Option<String>>;

    /// Write one metadata value, overwriting any prior value.
    async fn set_metadata(&self, entity_id: &str, key: &str, value: &str) -> GsyncResult<()>;

    /// Remove one metadata value. Removing an absent key is not an error.
    async fn delete_metadata(&self, entity_id: &str, key: &str) -> GsyncResult<()>;
}

/// Process-local entity store.
#[derive(Default)]
pub struct MemoryEntityStore {
    entities: RwLock<HashMap<String, Entity>>,
    metadata: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity.
    pub fn put(&self, entity: Entity) {
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());
        entities.insert(entity.id.clone(), entity);
    }

    /// Remove an entity. Its metadata is kept, like a store that deletes the
    /// row before the delete hook runs.
    pub fn remove(&self, entity_id: &str) -> Option<Entity> {
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());
        entities.remove(entity_id)
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn load(&self, entity_id: &str) -> GsyncResult<Option<Entity>> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        Ok(entities.get(entity_id).cloned())
    }

    async fn get_metadata(&self, entity_id: &str, key: &str) -> GsyncResult<Option<String>> {
        let metadata = self.metadata.read().unwrap_or_else(|e| e.into_inner());
        Ok(metadata.get(entity_id).and_then(|m| m.get(key)).cloned())
    }

    async fn set_metadata(&self, entity_id: &str, key: &str, value: &str) -> GsyncResult<()> {
        let mut metadata = self.metadata.write().unwrap_or_else(|e| e.into_inner());
        metadata
            .entry(entity_id.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_metadata(&self, entity_id: &str, key: &str) -> GsyncResult<()> {
        let mut metadata = self.metadata.write().unwrap_or_else(|e| e.into_inner());
        if let Some(m) = metadata.get_mut(entity_id) {
            m.remove(key);
        }
        Ok(())
    }
}
