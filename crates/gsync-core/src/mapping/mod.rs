//! Per-type field and related-record transforms.

pub mod attribute;
pub mod model;
pub mod validate;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::entity::model::Entity;
use crate::error::GsyncResult;
use model::{MappedData, RelatedMapping};

/// Projects an entity onto the fields of one graph record type.
///
/// Implementations must be pure: the same entity always maps to the same data.
pub trait FieldMapper: Send + Sync {
    fn map_fields(&self, entity: &Entity) -> GsyncResult<MappedData>;
}

/// Computes the records linked to an entity's graph record of one type.
pub trait RelatedMapper: Send + Sync {
    fn map_related(&self, entity: &Entity, record_type: &str) -> GsyncResult<RelatedMapping>;
}

impl<F> FieldMapper for F
where
    F: Fn(&Entity) -> GsyncResult<MappedData> + Send + Sync,
{
    fn map_fields(&self, entity: &Entity) -> GsyncResult<MappedData> {
        self(entity)
    }
}

impl<F> RelatedMapper for F
where
    F: Fn(&Entity, &str) -> GsyncResult<RelatedMapping> + Send + Sync,
{
    fn map_related(&self, entity: &Entity, record_type: &str) -> GsyncResult<RelatedMapping> {
        self(entity, record_type)
    }
}

/// Transform registry keyed by record type.
///
/// Each type holds at most one field transform and one related transform;
/// registering again replaces the previous one.
#[derive(Clone, Default)]
pub struct MapperRegistry {
    fields: HashMap<String, Arc<dyn FieldMapper>>,
    related: HashMap<String, Arc<dyn RelatedMapper>>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the field transform for a type, returning the one it replaced.
    pub fn register_fields(
        &mut self,
        record_type: impl Into<String>,
        mapper: impl FieldMapper + 'static,
    ) -> Option<Arc<dyn FieldMapper>> {
        let record_type = record_type.into();
        let previous = self.fields.insert(record_type.clone(), Arc::new(mapper));
        if previous.is_some() {
            debug!(record_type = %record_type, "Field transform replaced");
        }
        previous
    }

    /// Register the related transform for a type, returning the one it replaced.
    pub fn register_related(
        &mut self,
        record_type: impl Into<String>,
        mapper: impl RelatedMapper + 'static,
    ) -> Option<Arc<dyn RelatedMapper>> {
        let record_type = record_type.into();
        let previous = self.related.insert(record_type.clone(), Arc::new(mapper));
        if previous.is_some() {
            debug!(record_type = %record_type, "Related transform replaced");
        }
        previous
    }

    /// Mapped fields for `entity` as `record_type`; empty when no transform is registered.
    pub fn map_fields(&self, entity: &Entity, record_type: &str) -> GsyncResult<MappedData> {
        match self.fields.get(record_type) {
            Some(mapper) => mapper.map_fields(entity),
            None => Ok(MappedData::new()),
        }
    }

    /// Related records for `entity` as `record_type`; empty when no transform is registered.
    pub fn map_related(&self, entity: &Entity, record_type: &str) -> GsyncResult<RelatedMapping> {
        match self.related.get(record_type) {
            Some(mapper) => mapper.map_related(entity, record_type),
            None => Ok(RelatedMapping::new()),
        }
    }

    pub fn has_field_mapper(&self, record_type: &str) -> bool {
        self.fields.contains_key(record_type)
    }

    pub fn has_related_mapper(&self, record_type: &str) -> bool {
        self.related.contains_key(record_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GsyncError;
    use model::RelatedRecord;
    use serde_json::json;

    fn email_mapper(entity: &Entity) -> GsyncResult<MappedData> {
        let mut data = MappedData::new();
        data.insert("email".to_string(), entity.attribute("email").unwrap_or_default());
        Ok(data)
    }

    #[test]
    fn test_unregistered_type_maps_to_empty() {
        let registry = MapperRegistry::new();
        let entity = Entity::new("1", ["subscriber"]);

        assert!(registry.map_fields(&entity, "customer").unwrap().is_empty());
        assert!(registry.map_related(&entity, "customer").unwrap().is_empty());
    }

    #[test]
    fn test_closure_mappers() {
        let mut registry = MapperRegistry::new();
        registry.register_fields("customer", email_mapper);
        registry.register_related("customer", |entity: &Entity, record_type: &str| -> GsyncResult<RelatedMapping> {
            Ok(vec![RelatedRecord::new("store", entity.id.clone(), record_type.to_uppercase())])
        });

        let entity = Entity::new("1", ["subscriber"]).with_attribute("email", json!("a@b.c"));
        let fields = registry.map_fields(&entity, "customer").unwrap();
        assert_eq!(fields.get("email"), Some(&json!("a@b.c")));

        let related = registry.map_related(&entity, "customer").unwrap();
        assert_eq!(related, vec![RelatedRecord::new("store", "1", "CUSTOMER")]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = MapperRegistry::new();
        assert!(registry.register_fields("customer", email_mapper).is_none());

        let replaced = registry.register_fields("customer", |_: &Entity| -> GsyncResult<MappedData> {
            let mut data = MappedData::new();
            data.insert("tier".to_string(), json!("gold"));
            Ok(data)
        });
        assert!(replaced.is_some());

        let fields = registry.map_fields(&Entity::new("1", ["subscriber"]), "customer").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("tier"), Some(&json!("gold")));
    }

    #[test]
    fn test_mapper_error_propagates() {
        let mut registry = MapperRegistry::new();
        registry.register_fields("vendor", |_: &Entity| -> GsyncResult<MappedData> {
            Err(GsyncError::mapping("vendor", "no shop assigned"))
        });

        let err = registry.map_fields(&Entity::new("1", ["shop_manager"]), "vendor").unwrap_err();
        assert!(matches!(err, GsyncError::Mapping { .. }));
        assert!(registry.map_fields(&Entity::new("1", ["shop_manager"]), "customer").is_ok());
    }
}
