use thiserror::Error;

use crate::{RecordId, Version};

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record's stored revision did not match the revision the writer read.
    #[error(
        "Concurrency conflict for {kind} {record_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        kind: String,
        record_id: RecordId,
        expected: Version,
        actual: Version,
    },

    /// Another record of the same kind already holds this unique key.
    #[error("Duplicate key for {kind}: {key}")]
    DuplicateKey { kind: String, key: String },

    /// A write batch was rejected before touching storage.
    #[error("Invalid write: {0}")]
    InvalidWrite(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the error is an optimistic concurrency conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
