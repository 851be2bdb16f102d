//! Change events and sync reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::entity::model::ExternalRecordId;

/// Lifecycle change of an entity in the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Create,
    Update,
    Delete,
}

impl EventKind {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" | "created" => Some(Self::Create),
            "update" | "updated" => Some(Self::Update),
            "delete" | "deleted" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context that produced an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    /// An authoritative change made through the identity store.
    #[default]
    Primary,
    /// A secondary re-save of an already-reported change (background jobs,
    /// async requests). Create and update events from here are ignored.
    Background,
}

impl EventOrigin {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "primary" => Some(Self::Primary),
            "background" => Some(Self::Background),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Background => "background",
        }
    }
}

/// A change notification from the lifecycle trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: EventKind,
    pub entity_id: String,
    #[serde(default)]
    pub origin: EventOrigin,
}

impl ChangeEvent {
    pub fn new(kind: EventKind, entity_id: impl Into<String>) -> Self {
        Self {
            kind,
            entity_id: entity_id.into(),
            origin: EventOrigin::Primary,
        }
    }

    pub fn with_origin(mut self, origin: EventOrigin) -> Self {
        self.origin = origin;
        self
    }
}

/// A record written during one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncedRecord {
    pub record_type: String,
    pub external_id: ExternalRecordId,
}

/// Outcome of handling one change event.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub event_id: Uuid,
    pub kind: EventKind,
    pub entity_id: String,
    /// The event came from a background trigger and was ignored.
    pub skipped: bool,
    pub resolved_types: Vec<String>,
    pub synced: Vec<SyncedRecord>,
    pub deleted: Vec<ExternalRecordId>,
    /// Messages appended to the error log while handling the event.
    pub errors: Vec<String>,
}

impl SyncReport {
    pub fn new(event: &ChangeEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind: event.kind,
            entity_id: event.entity_id.clone(),
            skipped: false,
            resolved_types: Vec::new(),
            synced: Vec::new(),
            deleted: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserialize_default_origin() {
        let event: ChangeEvent = serde_json::from_str(r#"{"kind": "update", "entity_id": "42"}"#).unwrap();
        assert_eq!(event, ChangeEvent::new(EventKind::Update, "42"));

        let event: ChangeEvent =
            serde_json::from_str(r#"{"kind": "create", "entity_id": "1", "origin": "background"}"#).unwrap();
        assert_eq!(event.origin, EventOrigin::Background);
    }

    #[test]
    fn test_parse_kind_and_origin() {
        assert_eq!(EventKind::parse("Deleted"), Some(EventKind::Delete));
        assert_eq!(EventKind::parse("save"), None);
        assert_eq!(EventOrigin::parse("BACKGROUND"), Some(EventOrigin::Background));
        assert_eq!(EventKind::Update.to_string(), "update");
    }
}
