//! gsync core library
//!
//! Keeps graph records in step with identity-store users: resolves which
//! record types a user maps to from its roles, projects the user into each
//! type, and drives idempotent upserts/deletes against a graph store while
//! recording per-entity sync errors.

pub mod config;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod error_log;
pub mod graph;
pub mod mapping;
pub mod role_map;

pub use config::{ExternalIdScope, RecordTypeConfig, RelatedConfig, SyncConfiguration, SyncSettings};
pub use dispatcher::model::{ChangeEvent, EventKind, EventOrigin, SyncReport, SyncedRecord};
pub use dispatcher::SyncDispatcher;
pub use entity::model::{Entity, ExternalRecordId, EXTERNAL_ID_META_KEY};
pub use entity::{EntityStore, MemoryEntityStore};
pub use error::{GsyncError, GsyncResult};
pub use error_log::model::SyncError;
pub use error_log::{ErrorLog, MemoryErrorLog};
pub use graph::{GraphStoreAdapter, UpsertInstruction};
pub use mapping::model::{MappedData, RelatedMapping, RelatedRecord};
pub use mapping::{FieldMapper, MapperRegistry, RelatedMapper};
pub use role_map::RoleTypeMap;
