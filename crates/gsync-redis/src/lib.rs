//! gsync Redis data layer
//!
//! Stores the identity-store mirror the sync engine reads (entity documents
//! and their metadata), the per-entity sync error log, and the change-event
//! stream lifecycle triggers publish to.

pub mod client;
pub mod events;
pub mod queries;
pub mod store;

pub use client::{init_pool, Keys, RedisError, RedisPool, RedisResult, DEFAULT_KEY_PREFIX};
pub use events::{publish_event, EventListener, ListenerOptions, ListenerStats, DEFAULT_GROUP};
pub use queries::{entities, errors, metadata};
pub use store::RedisStore;
