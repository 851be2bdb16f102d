//! Redis-backed queries.

pub mod entities;
pub mod errors;
pub mod metadata;
