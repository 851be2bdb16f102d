//! Connections and dispatcher wiring shared by commands.

use anyhow::{Context, Result};
use gsync_core::SyncDispatcher;
use gsync_graph::Neo4jGraphStore;
use gsync_redis::RedisStore;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::config::FileConfig;

/// Loaded configuration plus a Redis store.
pub struct AppContext {
    pub config: FileConfig,
    pub store: RedisStore,
}

impl AppContext {
    /// Load the configuration and connect to Redis.
    pub async fn open(config_path: &Path) -> Result<Self> {
        let config = FileConfig::load(config_path)?;
        let pool = gsync_redis::init_pool(&config.redis.url)
            .await
            .with_context(|| format!("Failed to connect to Redis at {}", config.redis.url))?;
        debug!(url = %config.redis.url, prefix = %config.redis.key_prefix, "Connected to Redis");

        let store = RedisStore::new(pool, &config.redis.key_prefix);
        Ok(Self { config, store })
    }

    /// Connect to Neo4j and build a dispatcher over this context's store.
    pub async fn dispatcher(&self) -> Result<SyncDispatcher> {
        let sync_config = self.config.sync_configuration()?;
        let graph = Neo4jGraphStore::connect(&self.config.graph)
            .await
            .with_context(|| format!("Failed to connect to Neo4j at {}", self.config.graph.uri))?;
        debug!(uri = %self.config.graph.uri, "Connected to Neo4j");

        Ok(SyncDispatcher::new(
            Arc::new(sync_config),
            Arc::new(self.store.clone()),
            Arc::new(graph),
            Arc::new(self.store.clone()),
        ))
    }
}
