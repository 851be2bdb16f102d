//! Sync configuration.
//!
//! [`SyncSettings`] is the deserialized `[sync]` + `[[record_types]]` part of
//! the configuration file. [`SyncConfiguration`] is the immutable value the
//! dispatcher runs with: the role map, the transform registry and the
//! external id scope.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::entity::model::EXTERNAL_ID_META_KEY;
use crate::error::{GsyncError, GsyncResult};
use crate::mapping::attribute::{AttributeFieldMapper, AttributeRelatedMapper};
use crate::mapping::validate::is_identifier;
use crate::mapping::{FieldMapper, MapperRegistry, RelatedMapper};
use crate::role_map::RoleTypeMap;

/// Where the graph record id of an entity is cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalIdScope {
    /// One slot per entity; the last synced type wins.
    #[default]
    Entity,
    /// One slot per (entity, record type).
    RecordType,
}

impl ExternalIdScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::RecordType => "record_type",
        }
    }
}

/// A configured related-record rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedConfig {
    pub target_type: String,
    pub key_attribute: String,
    pub relation: String,
}

/// A configured record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypeConfig {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Graph field name to entity attribute path.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub related: Vec<RelatedConfig>,
}

/// `[sync]` options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(default)]
    pub external_id_scope: ExternalIdScope,
}

/// Sync part of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default)]
    pub sync: SyncOptions,
    #[serde(default)]
    pub record_types: Vec<RecordTypeConfig>,
}

/// Immutable configuration handed to the dispatcher.
#[derive(Clone, Default)]
pub struct SyncConfiguration {
    role_map: RoleTypeMap,
    mappers: MapperRegistry,
    external_id_scope: ExternalIdScope,
}

impl SyncConfiguration {
    pub fn new(role_map: RoleTypeMap) -> Self {
        Self {
            role_map,
            ..Self::default()
        }
    }

    /// Build from settings, registering declarative transforms for types that
    /// configure `fields` or `related`.
    pub fn from_settings(settings: &SyncSettings) -> GsyncResult<Self> {
        let mut role_map = RoleTypeMap::new();
        let mut mappers = MapperRegistry::new();
        let mut seen = HashSet::new();

        for record_type in &settings.record_types {
            if !is_identifier(&record_type.name) {
                return Err(GsyncError::config(format!(
                    "record type name '{}' must match [A-Za-z_][A-Za-z0-9_]*",
                    record_type.name
                )));
            }
            if !seen.insert(record_type.name.as_str()) {
                return Err(GsyncError::config(format!(
                    "record type '{}' is configured more than once",
                    record_type.name
                )));
            }
            for rule in &record_type.related {
                if !is_identifier(&rule.target_type) || !is_identifier(&rule.relation) {
                    return Err(GsyncError::config(format!(
                        "record type '{}': related target type and relation must be identifiers (got '{}' / '{}')",
                        record_type.name, rule.target_type, rule.relation
                    )));
                }
            }

            role_map.insert(record_type.name.clone(), record_type.roles.iter().cloned());

            if !record_type.fields.is_empty() {
                mappers.register_fields(
                    record_type.name.clone(),
                    AttributeFieldMapper::new(record_type.fields.clone()),
                );
            }
            if !record_type.related.is_empty() {
                mappers.register_related(
                    record_type.name.clone(),
                    AttributeRelatedMapper::new(record_type.related.clone()),
                );
            }
        }

        Ok(Self {
            role_map,
            mappers,
            external_id_scope: settings.sync.external_id_scope,
        })
    }

    /// Builder-style field transform registration (overrides configuration).
    pub fn with_field_mapper(
        mut self,
        record_type: impl Into<String>,
        mapper: impl FieldMapper + 'static,
    ) -> Self {
        self.mappers.register_fields(record_type, mapper);
        self
    }

    /// Builder-style related transform registration (overrides configuration).
    pub fn with_related_mapper(
        mut self,
        record_type: impl Into<String>,
        mapper: impl RelatedMapper + 'static,
    ) -> Self {
        self.mappers.register_related(record_type, mapper);
        self
    }

    pub fn with_external_id_scope(mut self, scope: ExternalIdScope) -> Self {
        self.external_id_scope = scope;
        self
    }

    pub fn role_map(&self) -> &RoleTypeMap {
        &self.role_map
    }

    pub fn mappers(&self) -> &MapperRegistry {
        &self.mappers
    }

    pub fn external_id_scope(&self) -> ExternalIdScope {
        self.external_id_scope
    }

    /// Metadata key caching the external id written by a sync of `record_type`.
    pub fn external_id_key(&self, record_type: &str) -> String {
        match self.external_id_scope {
            ExternalIdScope::Entity => EXTERNAL_ID_META_KEY.to_string(),
            ExternalIdScope::RecordType => format!("{}:{}", EXTERNAL_ID_META_KEY, record_type),
        }
    }

    /// Every metadata key that may hold an external id for an entity.
    pub fn external_id_keys(&self) -> Vec<String> {
        match self.external_id_scope {
            ExternalIdScope::Entity => vec![EXTERNAL_ID_META_KEY.to_string()],
            ExternalIdScope::RecordType => self
                .role_map
                .record_types()
                .map(|t| self.external_id_key(t))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::model::Entity;
    use serde_json::json;

    fn record_type(name: &str, roles: &[&str]) -> RecordTypeConfig {
        RecordTypeConfig {
            name: name.to_string(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            fields: BTreeMap::new(),
            related: Vec::new(),
        }
    }

    #[test]
    fn test_from_settings_keeps_order_and_registers_transforms() {
        let mut customer = record_type("customer", &["subscriber"]);
        customer.fields.insert("email".to_string(), "email".to_string());
        let settings = SyncSettings {
            sync: SyncOptions::default(),
            record_types: vec![customer, record_type("vendor", &["shop_manager"])],
        };

        let config = SyncConfiguration::from_settings(&settings).unwrap();
        assert_eq!(
            config.role_map().record_types().collect::<Vec<_>>(),
            vec!["customer", "vendor"]
        );
        assert!(config.mappers().has_field_mapper("customer"));
        assert!(!config.mappers().has_field_mapper("vendor"));
        assert!(!config.mappers().has_related_mapper("customer"));

        let entity = Entity::new("1", ["subscriber"]).with_attribute("email", json!("a@b.c"));
        let fields = config.mappers().map_fields(&entity, "customer").unwrap();
        assert_eq!(fields["email"], json!("a@b.c"));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let settings = SyncSettings {
            sync: SyncOptions::default(),
            record_types: vec![
                record_type("customer", &["subscriber"]),
                record_type("customer", &["editor"]),
            ],
        };
        let err = SyncConfiguration::from_settings(&settings).err().unwrap();
        assert!(matches!(err, GsyncError::Config(_)));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let settings = SyncSettings {
            sync: SyncOptions::default(),
            record_types: vec![record_type("shop-vendor", &["shop_manager"])],
        };
        assert!(SyncConfiguration::from_settings(&settings).is_err());

        let mut customer = record_type("customer", &["subscriber"]);
        customer.related.push(RelatedConfig {
            target_type: "store".to_string(),
            key_attribute: "store_id".to_string(),
            relation: "shops at".to_string(),
        });
        let settings = SyncSettings {
            sync: SyncOptions::default(),
            record_types: vec![customer],
        };
        assert!(SyncConfiguration::from_settings(&settings).is_err());
    }

    #[test]
    fn test_external_id_keys_per_scope() {
        let role_map = RoleTypeMap::new()
            .with_type("customer", ["subscriber"])
            .with_type("vendor", ["shop_manager"]);

        let entity_scope = SyncConfiguration::new(role_map.clone());
        assert_eq!(entity_scope.external_id_key("vendor"), "external_id");
        assert_eq!(entity_scope.external_id_keys(), vec!["external_id"]);

        let type_scope = SyncConfiguration::new(role_map).with_external_id_scope(ExternalIdScope::RecordType);
        assert_eq!(type_scope.external_id_key("vendor"), "external_id:vendor");
        assert_eq!(
            type_scope.external_id_keys(),
            vec!["external_id:customer", "external_id:vendor"]
        );
    }

    #[test]
    fn test_scope_deserializes_snake_case() {
        let options: SyncOptions = serde_json::from_str(r#"{"external_id_scope": "record_type"}"#).unwrap();
        assert_eq!(options.external_id_scope, ExternalIdScope::RecordType);
        assert_eq!(SyncOptions::default().external_id_scope.as_str(), "entity");
    }
}
