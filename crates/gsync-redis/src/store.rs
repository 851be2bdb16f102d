//! `EntityStore` and `ErrorLog` over Redis.

use async_trait::async_trait;
use gsync_core::{Entity, EntityStore, ErrorLog, GsyncResult, SyncError};

use crate::client::{Keys, RedisPool};
use crate::queries::{entities, errors, metadata};

/// Redis-backed entity store and error log sharing one pool.
#[derive(Clone)]
pub struct RedisStore {
    pool: RedisPool,
    keys: Keys,
}

impl RedisStore {
    pub fn new(pool: RedisPool, key_prefix: &str) -> Self {
        Self {
            pool,
            keys: Keys::new(key_prefix),
        }
    }

    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }
}

#[async_trait]
impl EntityStore for RedisStore {
    async fn load(&self, entity_id: &str) -> GsyncResult<Option<Entity>> {
        Ok(entities::get_entity(&self.pool, &self.keys, entity_id).await?)
    }

    async fn get_metadata(&self, entity_id: &str, key: &str) -> GsyncResult<Option<String>> {
        Ok(metadata::get_metadata(&self.pool, &self.keys, entity_id, key).await?)
    }

    async fn set_metadata(&self, entity_id: &str, key: &str, value: &str) -> GsyncResult<()> {
        Ok(metadata::set_metadata(&self.pool, &self.keys, entity_id, key, value).await?)
    }

    async fn delete_metadata(&self, entity_id: &str, key: &str) -> GsyncResult<()> {
        Ok(metadata::delete_metadata(&self.pool, &self.keys, entity_id, key).await?)
    }
}

#[async_trait]
impl ErrorLog for RedisStore {
    async fn add(&self, entity_id: &str, messages: &[String]) -> GsyncResult<()> {
        let rows: Vec<SyncError> = messages
            .iter()
            .map(|m| SyncError::now(entity_id, m.as_str()))
            .collect();
        Ok(errors::append_errors(&self.pool, &self.keys, entity_id, &rows).await?)
    }

    async fn get(&self, entity_id: &str) -> GsyncResult<Vec<SyncError>> {
        Ok(errors::list_errors(&self.pool, &self.keys, entity_id).await?)
    }
}
