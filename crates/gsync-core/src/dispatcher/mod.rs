//! Change-event dispatcher.
//!
//! For each event the dispatcher walks
//! `Received -> Resolved -> per type (Mapped -> Submitted -> Succeeded | Failed) -> Completed`:
//!
//! - create/update: load the entity, resolve its record types, map and
//!   submit one upsert per type, cache the returned external id
//! - delete: delete every cached external id, or do nothing when none exists
//!
//! Failures never escape: each one is appended to the error log and the
//! remaining work for the event continues.

pub mod locks;
pub mod model;

use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::SyncConfiguration;
use crate::entity::model::{Entity, ExternalRecordId};
use crate::entity::EntityStore;
use crate::error::{GsyncError, GsyncResult};
use crate::error_log::ErrorLog;
use crate::graph::{GraphStoreAdapter, UpsertInstruction};
use crate::mapping::validate::{validate_fields, validate_related};
use locks::EntityLocks;
use model::{ChangeEvent, EventKind, EventOrigin, SyncReport, SyncedRecord};

/// Orchestrates entity change events against the graph store.
pub struct SyncDispatcher {
    config: Arc<SyncConfiguration>,
    entities: Arc<dyn EntityStore>,
    graph: Arc<dyn GraphStoreAdapter>,
    errors: Arc<dyn ErrorLog>,
    locks: EntityLocks,
}

impl SyncDispatcher {
    pub fn new(
        config: Arc<SyncConfiguration>,
        entities: Arc<dyn EntityStore>,
        graph: Arc<dyn GraphStoreAdapter>,
        errors: Arc<dyn ErrorLog>,
    ) -> Self {
        Self {
            config,
            entities,
            graph,
            errors,
            locks: EntityLocks::new(),
        }
    }

    pub fn config(&self) -> &SyncConfiguration {
        &self.config
    }

    /// The entity was created in the identity store.
    pub async fn on_create(&self, entity_id: &str) -> SyncReport {
        self.handle(&ChangeEvent::new(EventKind::Create, entity_id)).await
    }

    /// The entity was updated in the identity store.
    pub async fn on_update(&self, entity_id: &str) -> SyncReport {
        self.handle(&ChangeEvent::new(EventKind::Update, entity_id)).await
    }

    /// The entity is being deleted from the identity store.
    pub async fn on_delete(&self, entity_id: &str) -> SyncReport {
        self.handle(&ChangeEvent::new(EventKind::Delete, entity_id)).await
    }

    /// Handle one change event to completion.
    pub async fn handle(&self, event: &ChangeEvent) -> SyncReport {
        let mut report = SyncReport::new(event);
        let span = info_span!(
            "sync_event",
            event_id = %report.event_id,
            kind = %event.kind,
            entity_id = %event.entity_id,
        );

        async {
            if event.kind != EventKind::Delete && event.origin == EventOrigin::Background {
                debug!("Ignoring background re-save");
                report.skipped = true;
                return;
            }

            let _guard = self.locks.acquire(&event.entity_id).await;

            match event.kind {
                EventKind::Create | EventKind::Update => self.sync_entity(event, &mut report).await,
                EventKind::Delete => self.delete_entity(event, &mut report).await,
            }

            if !report.errors.is_empty() {
                self.record_errors(&event.entity_id, &report.errors).await;
            }

            info!(
                synced = report.synced.len(),
                deleted = report.deleted.len(),
                errors = report.errors.len(),
                "Event handled"
            );
        }
        .instrument(span)
        .await;

        report
    }

    async fn sync_entity(&self, event: &ChangeEvent, report: &mut SyncReport) {
        let entity = match self.entities.load(&event.entity_id).await {
            Ok(Some(entity)) => entity,
            Ok(None) => {
                let err = GsyncError::EntityNotFound(event.entity_id.clone());
                warn!(error = %err, "Entity load failed");
                report.errors.push(err.to_string());
                return;
            }
            Err(e) => {
                let err = GsyncError::EntityNotFound(event.entity_id.clone());
                warn!(error = %e, "Entity load failed");
                report.errors.push(format!("{}: {}", err, e));
                return;
            }
        };

        let record_types = self.config.role_map().resolve_types(&entity.roles);
        report.resolved_types = record_types.iter().map(|t| t.to_string()).collect();
        debug!(record_types = ?report.resolved_types, "Resolved record types");

        for record_type in record_types {
            match self.sync_record_type(&entity, record_type).await {
                Ok(external_id) => {
                    debug!(record_type, external_id = %external_id, "Synced record");
                    report.synced.push(SyncedRecord {
                        record_type: record_type.to_string(),
                        external_id,
                    });
                }
                Err(e) => {
                    warn!(record_type, error = %e, "Record type sync failed");
                    report.errors.push(format!("[{}] {}", record_type, e));
                }
            }
        }
    }

    async fn sync_record_type(&self, entity: &Entity, record_type: &str) -> GsyncResult<ExternalRecordId> {
        let mappers = self.config.mappers();
        let fields = mappers.map_fields(entity, record_type)?;
        let related = mappers.map_related(entity, record_type)?;
        validate_fields(record_type, &fields)?;
        validate_related(record_type, &related)?;

        let instruction = UpsertInstruction {
            entity_id: entity.id.clone(),
            record_type: record_type.to_string(),
            fields,
            related,
        };
        let external_id = self.graph.upsert(&instruction).await?;

        let key = self.config.external_id_key(record_type);
        self.entities
            .set_metadata(&entity.id, &key, external_id.as_str())
            .await?;

        Ok(external_id)
    }

    async fn delete_entity(&self, event: &ChangeEvent, report: &mut SyncReport) {
        let mut found = false;

        for key in self.config.external_id_keys() {
            let external_id = match self.entities.get_metadata(&event.entity_id, &key).await {
                Ok(Some(id)) if !id.trim().is_empty() => ExternalRecordId::new(id),
                Ok(_) => continue,
                Err(e) => {
                    warn!(key = %key, error = %e, "External id lookup failed");
                    report.errors.push(format!("external id lookup '{}': {}", key, e));
                    continue;
                }
            };
            found = true;

            if let Err(e) = self.graph.delete(&external_id).await {
                warn!(external_id = %external_id, error = %e, "Graph delete failed");
                report.errors.push(format!("delete {}: {}", external_id, e));
                continue;
            }

            if let Err(e) = self.entities.delete_metadata(&event.entity_id, &key).await {
                warn!(key = %key, error = %e, "Clearing cached external id failed");
            }
            debug!(external_id = %external_id, "Deleted record");
            report.deleted.push(external_id);
        }

        if !found {
            debug!("No external id cached; nothing to delete");
        }
    }

    async fn record_errors(&self, entity_id: &str, messages: &[String]) {
        if let Err(e) = self.errors.add(entity_id, messages).await {
            error!(entity_id, error = %e, lost = messages.len(), "Failed to write sync error log");
        }
    }
}
