//! # gsync Graph
//!
//! Neo4j side of gsync: connection client, schema initialization and the
//! `GraphStoreAdapter` that writes synced records with retries.

pub mod adapter;
pub mod client;
pub mod cypher;
pub mod queries;
pub mod schema;
pub mod value;

pub use adapter::{Neo4jGraphStore, RetryPolicy};
pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use queries::inspect::{count_by_type, get_record, records_for_entity, RecordView, RelationView, TypeCount};
pub use schema::initialize_schema;
