//! Role to record-type resolution.

use std::collections::BTreeSet;

/// Ordered mapping from graph record type to the roles that qualify an entity
/// for it.
///
/// Insertion order is dispatch order. Role sets may overlap, so one entity can
/// qualify for several types in a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTypeMap {
    entries: Vec<(String, BTreeSet<String>)>,
}

impl RoleTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `record_type` to `roles`.
    ///
    /// Re-inserting an existing type replaces its roles and keeps its original
    /// position.
    pub fn insert<I, S>(&mut self, record_type: impl Into<String>, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record_type = record_type.into();
        let roles: BTreeSet<String> = roles.into_iter().map(Into::into).collect();

        match self.entries.iter_mut().find(|(name, _)| *name == record_type) {
            Some((_, existing)) => *existing = roles,
            None => self.entries.push((record_type, roles)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_type<I, S>(mut self, record_type: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(record_type, roles);
        self
    }

    /// Types whose role set intersects `entity_roles`, in configured order.
    pub fn resolve_types(&self, entity_roles: &BTreeSet<String>) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, roles)| !roles.is_disjoint(entity_roles))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// All configured type names, in order.
    pub fn record_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Roles configured for one type.
    pub fn roles_for(&self, record_type: &str) -> Option<&BTreeSet<String>> {
        self.entries
            .iter()
            .find(|(name, _)| name == record_type)
            .map(|(_, roles)| roles)
    }

    pub fn contains(&self, record_type: &str) -> bool {
        self.roles_for(record_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
