//! Entity domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Metadata key holding the cached graph record id of an entity.
pub const EXTERNAL_ID_META_KEY: &str = "external_id";

/// A primary-store user record.
///
/// The identity store owns the lifecycle of entities; the sync engine only
/// reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl Entity {
    /// Create an entity with no attributes.
    pub fn new<I, S>(id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Look up an attribute by dotted path (`profile.display_name`).
    ///
    /// `id` and `roles` resolve to the entity's own id and role list unless an
    /// attribute of the same name exists.
    pub fn attribute(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;

        let root = match self.attributes.get(head) {
            Some(value) => value.clone(),
            None => match head {
                "id" => Value::String(self.id.clone()),
                "roles" => Value::Array(self.roles.iter().cloned().map(Value::String).collect()),
                _ => return None,
            },
        };

        segments.try_fold(root, |current, segment| match current {
            Value::Object(mut map) => map.remove(segment),
            Value::Array(mut items) => {
                let index: usize = segment.parse().ok()?;
                (index < items.len()).then(|| items.swap_remove(index))
            }
            _ => None,
        })
    }
}

/// Opaque identifier of the graph record mirroring an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalRecordId(String);

impl ExternalRecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalRecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
