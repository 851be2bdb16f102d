//! Centralized error types for gsync.

use thiserror::Error;

/// Main error type for gsync operations.
#[derive(Error, Debug)]
pub enum GsyncError {
    #[error("Unable to fetch entity {0}")]
    EntityNotFound(String),

    #[error("Mapping error for record type '{record_type}': {message}")]
    Mapping {
        record_type: String,
        message: String,
    },

    #[error("Graph store write failed: {0}")]
    StoreWrite(String),

    #[error("Entity store error: {0}")]
    Store(String),

    #[error("Invalid identifier '{0}': expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for gsync operations.
pub type GsyncResult<T> = Result<T, GsyncError>;

impl GsyncError {
    /// Create a mapping error for a record type.
    pub fn mapping(record_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Mapping {
            record_type: record_type.into(),
            message: message.into(),
        }
    }

    /// Create a graph store write error.
    pub fn store_write(msg: impl Into<String>) -> Self {
        Self::StoreWrite(msg.into())
    }

    /// Create an entity store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
