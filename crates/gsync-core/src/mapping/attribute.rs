//! Declarative transforms built from the `[[record_types]]` configuration.
//!
//! - `fields` maps a graph field name to a dotted entity attribute path.
//! - `related` derives linked records from an attribute holding one key or a
//!   list of keys.

use serde_json::Value;
use std::collections::BTreeMap;

use super::model::{MappedData, RelatedMapping, RelatedRecord};
use super::{FieldMapper, RelatedMapper};
use crate::config::RelatedConfig;
use crate::entity::model::Entity;
use crate::error::{GsyncError, GsyncResult};

/// Copies entity attributes into graph fields.
///
/// A missing attribute maps to `null`, which clears a value left on the
/// record by an earlier sync.
#[derive(Debug, Clone)]
pub struct AttributeFieldMapper {
    fields: BTreeMap<String, String>,
}

impl AttributeFieldMapper {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

impl FieldMapper for AttributeFieldMapper {
    fn map_fields(&self, entity: &Entity) -> GsyncResult<MappedData> {
        Ok(self
            .fields
            .iter()
            .map(|(field, path)| (field.clone(), entity.attribute(path).unwrap_or(Value::Null)))
            .collect())
    }
}

/// Emits one related record per key found under each configured attribute.
#[derive(Debug, Clone)]
pub struct AttributeRelatedMapper {
    rules: Vec<RelatedConfig>,
}

impl AttributeRelatedMapper {
    pub fn new(rules: Vec<RelatedConfig>) -> Self {
        Self { rules }
    }
}

impl RelatedMapper for AttributeRelatedMapper {
    fn map_related(&self, entity: &Entity, record_type: &str) -> GsyncResult<RelatedMapping> {
        let mut related = RelatedMapping::new();

        for rule in &self.rules {
            let keys = match entity.attribute(&rule.key_attribute) {
                None | Some(Value::Null) => continue,
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| key_string(item, record_type, &rule.key_attribute))
                    .collect::<GsyncResult<Vec<_>>>()?,
                Some(other) => vec![key_string(&other, record_type, &rule.key_attribute)?],
            };

            related.extend(
                keys.into_iter()
                    .map(|key| RelatedRecord::new(&rule.target_type, key, &rule.relation)),
            );
        }

        Ok(related)
    }
}

fn key_string(value: &Value, record_type: &str, attribute: &str) -> GsyncResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(GsyncError::mapping(
            record_type,
            format!("attribute '{}' holds an unusable related key: {}", attribute, other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(target_type: &str, key_attribute: &str, relation: &str) -> RelatedConfig {
        RelatedConfig {
            target_type: target_type.to_string(),
            key_attribute: key_attribute.to_string(),
            relation: relation.to_string(),
        }
    }

    #[test]
    fn test_field_mapper_copies_paths() {
        let mapper = AttributeFieldMapper::new(BTreeMap::from([
            ("email".to_string(), "email".to_string()),
            ("name".to_string(), "profile.display_name".to_string()),
            ("user_id".to_string(), "id".to_string()),
            ("phone".to_string(), "profile.phone".to_string()),
        ]));
        let entity = Entity::new("42", ["subscriber"])
            .with_attribute("email", json!("ada@example.com"))
            .with_attribute("profile", json!({"display_name": "Ada"}));

        let data = mapper.map_fields(&entity).unwrap();
        assert_eq!(data.len(), 4);
        assert_eq!(data["email"], json!("ada@example.com"));
        assert_eq!(data["name"], json!("Ada"));
        assert_eq!(data["user_id"], json!("42"));
        assert_eq!(data["phone"], Value::Null);
    }

    #[test]
    fn test_related_mapper_scalar_and_list_keys() {
        let mapper = AttributeRelatedMapper::new(vec![
            rule("store", "store_ids", "SHOPS_AT"),
            rule("region", "region", "LIVES_IN"),
        ]);
        let entity = Entity::new("42", ["subscriber"])
            .with_attribute("store_ids", json!([7, "eu-1"]))
            .with_attribute("region", json!("emea"));

        let related = mapper.map_related(&entity, "customer").unwrap();
        assert_eq!(
            related,
            vec![
                RelatedRecord::new("store", "7", "SHOPS_AT"),
                RelatedRecord::new("store", "eu-1", "SHOPS_AT"),
                RelatedRecord::new("region", "emea", "LIVES_IN"),
            ]
        );
    }

    #[test]
    fn test_related_mapper_skips_missing_and_null() {
        let mapper = AttributeRelatedMapper::new(vec![
            rule("store", "store_ids", "SHOPS_AT"),
            rule("region", "region", "LIVES_IN"),
        ]);
        let entity = Entity::new("42", ["subscriber"]).with_attribute("region", Value::Null);

        assert!(mapper.map_related(&entity, "customer").unwrap().is_empty());
    }

    #[test]
    fn test_related_mapper_rejects_object_keys() {
        let mapper = AttributeRelatedMapper::new(vec![rule("store", "store", "SHOPS_AT")]);
        let entity = Entity::new("42", ["subscriber"]).with_attribute("store", json!({"id": 7}));

        let err = mapper.map_related(&entity, "customer").unwrap_err();
        match err {
            GsyncError::Mapping { record_type, message } => {
                assert_eq!(record_type, "customer");
                assert!(message.contains("store"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
