//! Configuration file loading.

use anyhow::{Context, Result};
use gsync_core::config::SyncOptions;
use gsync_core::{RecordTypeConfig, SyncConfiguration, SyncSettings};
use gsync_graph::GraphConfig;
use serde::Deserialize;
use std::path::Path;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "gsync.toml";

/// `[redis]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub url: String,
    pub key_prefix: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: gsync_redis::DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub redis: RedisSettings,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub sync: SyncOptions,
    #[serde(default)]
    pub record_types: Vec<RecordTypeConfig>,
}

impl FileConfig {
    /// Read and parse a configuration file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let mut config = Self::parse(&raw)
            .with_context(|| format!("Invalid configuration file {}", path.display()))?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `REDIS_URL`, `NEO4J_URI`, `NEO4J_USER` and `NEO4J_PASSWORD`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REDIS_URL") {
            self.redis.url = url;
        }
        if let Some(uri) = lookup("NEO4J_URI") {
            self.graph.uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USER") {
            self.graph.user = user;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.graph.password = password;
        }
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            sync: self.sync.clone(),
            record_types: self.record_types.clone(),
        }
    }

    /// Validate the record types and build the dispatcher configuration.
    pub fn sync_configuration(&self) -> Result<SyncConfiguration> {
        Ok(SyncConfiguration::from_settings(&self.sync_settings())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsync_core::ExternalIdScope;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
[redis]
url = "redis://cache:6379"
key_prefix = "shop"

[graph]
uri = "bolt://graph:7687"
max_retries = 5

[sync]
external_id_scope = "record_type"

[[record_types]]
name = "Customer"
roles = ["customer", "vip"]

[record_types.fields]
name = "profile.display_name"
email = "email"

[[record_types.related]]
target_type = "Store"
key_attribute = "store_ids"
relation = "SHOPS_AT"

[[record_types]]
name = "Employee"
roles = ["staff"]
"#;

    #[test]
    fn test_parse_full_file() {
        let config = FileConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.redis.url, "redis://cache:6379");
        assert_eq!(config.redis.key_prefix, "shop");
        assert_eq!(config.graph.uri, "bolt://graph:7687");
        assert_eq!(config.graph.max_retries, 5);
        assert_eq!(config.graph.user, "neo4j");
        assert_eq!(config.sync.external_id_scope, ExternalIdScope::RecordType);
        assert_eq!(config.record_types.len(), 2);
        assert_eq!(config.record_types[0].fields["name"], "profile.display_name");
        assert_eq!(config.record_types[0].related[0].relation, "SHOPS_AT");
    }

    #[test]
    fn test_sections_default() {
        let config = FileConfig::parse("[[record_types]]\nname = \"Customer\"\n").unwrap();
        assert_eq!(config.redis.key_prefix, "gsync");
        assert_eq!(config.graph.database, "neo4j");
        assert_eq!(config.sync.external_id_scope, ExternalIdScope::Entity);
    }

    #[test]
    fn test_sync_configuration_keeps_type_order() {
        let config = FileConfig::parse(SAMPLE).unwrap();
        let sync = config.sync_configuration().unwrap();
        let types: Vec<&str> = sync.role_map().record_types().collect();
        assert_eq!(types, vec!["Customer", "Employee"]);
        assert!(sync.mappers().has_field_mapper("Customer"));
        assert!(!sync.mappers().has_field_mapper("Employee"));
    }

    #[test]
    fn test_duplicate_type_is_rejected() {
        let raw = "[[record_types]]\nname = \"A\"\n[[record_types]]\nname = \"A\"\n";
        let config = FileConfig::parse(raw).unwrap();
        assert!(config.sync_configuration().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = FileConfig::parse(SAMPLE).unwrap();
        let env: HashMap<&str, &str> = [("REDIS_URL", "redis://other:6380"), ("NEO4J_PASSWORD", "secret")]
            .into_iter()
            .collect();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.redis.url, "redis://other:6380");
        assert_eq!(config.graph.password, "secret");
        assert_eq!(config.graph.uri, "bolt://graph:7687");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = FileConfig::load(Path::new("/nonexistent/gsync.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read configuration file"));
    }
}
