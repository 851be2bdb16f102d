//! Validation of mapping output before it reaches the graph store.

use super::model::{MappedData, RelatedMapping};
use crate::error::{GsyncError, GsyncResult};

/// Field names the graph adapter writes itself.
pub const RESERVED_FIELDS: &[&str] = &["record_id", "entity_id", "record_type", "synced_at"];

/// Whether `name` can be used as a graph label or relation type.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Fail with `InvalidIdentifier` unless `name` is an identifier.
pub fn require_identifier(name: &str) -> GsyncResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(GsyncError::InvalidIdentifier(name.to_string()))
    }
}

/// Check mapped field names.
pub fn validate_fields(record_type: &str, fields: &MappedData) -> GsyncResult<()> {
    for name in fields.keys() {
        if name.trim().is_empty() {
            return Err(GsyncError::mapping(record_type, "empty field name"));
        }
        if RESERVED_FIELDS.contains(&name.as_str()) {
            return Err(GsyncError::mapping(
                record_type,
                format!("field '{}' is reserved", name),
            ));
        }
    }
    Ok(())
}

/// Check related-record descriptors.
pub fn validate_related(record_type: &str, related: &RelatedMapping) -> GsyncResult<()> {
    for (index, record) in related.iter().enumerate() {
        if !is_identifier(&record.target_type) {
            return Err(GsyncError::mapping(
                record_type,
                format!("related[{}]: invalid target type '{}'", index, record.target_type),
            ));
        }
        if !is_identifier(&record.relation) {
            return Err(GsyncError::mapping(
                record_type,
                format!("related[{}]: invalid relation '{}'", index, record.relation),
            ));
        }
        if record.target_key.trim().is_empty() {
            return Err(GsyncError::mapping(
                record_type,
                format!("related[{}]: empty target key", index),
            ));
        }
    }
    Ok(())
}
