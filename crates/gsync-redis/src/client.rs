//! Redis connection pool management.

use gsync_core::GsyncError;
use redis::aio::ConnectionManager;
use thiserror::Error;

/// Default key namespace.
pub const DEFAULT_KEY_PREFIX: &str = "gsync";

/// Redis error types.
#[derive(Error, Debug)]
pub enum RedisError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for Redis operations.
pub type RedisResult<T> = Result<T, RedisError>;

impl From<RedisError> for GsyncError {
    fn from(err: RedisError) -> Self {
        GsyncError::store(err.to_string())
    }
}

/// Redis connection pool. ConnectionManager multiplexes and reconnects
/// internally; clone it to get a mutable handle for each operation.
pub type RedisPool = ConnectionManager;

/// Initialize a Redis connection pool from a URL.
///
/// Example URL: `redis://127.0.0.1:6379`
pub async fn init_pool(redis_url: &str) -> RedisResult<RedisPool> {
    let client = redis::Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;
    Ok(manager)
}

/// Key builder for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    prefix: String,
}

impl Keys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Entity JSON document.
    pub fn entity(&self, entity_id: &str) -> String {
        format!("{}:entity:{}", self.prefix, entity_id)
    }

    /// Metadata hash of an entity.
    pub fn metadata(&self, entity_id: &str) -> String {
        format!("{}:meta:{}", self.prefix, entity_id)
    }

    /// Error list of an entity.
    pub fn errors(&self, entity_id: &str) -> String {
        format!("{}:errors:{}", self.prefix, entity_id)
    }

    /// Set of every stored entity id.
    pub fn entity_index(&self) -> String {
        format!("{}:entities", self.prefix)
    }

    /// Change-event stream.
    pub fn events(&self) -> String {
        format!("{}:events", self.prefix)
    }
}

impl Default for Keys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = Keys::new("shop");
        assert_eq!(keys.entity("42"), "shop:entity:42");
        assert_eq!(keys.metadata("42"), "shop:meta:42");
        assert_eq!(keys.errors("42"), "shop:errors:42");
        assert_eq!(keys.entity_index(), "shop:entities");
        assert_eq!(keys.events(), "shop:events");
        assert_eq!(Keys::default().events(), "gsync:events");
    }

    #[test]
    fn test_redis_error_converts_to_store_error() {
        let err: GsyncError = RedisError::NotFound("entity 42".to_string()).into();
        assert!(matches!(err, GsyncError::Store(_)));
        assert!(err.to_string().contains("entity 42"));
    }
}
