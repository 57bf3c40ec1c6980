//! Domain error types.

use record_store::StoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced user or item does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A cart mutation was requested with an unusable quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i64 },

    /// Another user already holds this username.
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Input rejected before anything was written.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The record store failed. Surfaced unchanged.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl DomainError {
    /// Creates a not-found error for the given entity and lookup key.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Returns true if a referenced entity was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }

    /// Returns true if the error is a store-level revision conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Storage(e) if e.is_conflict())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Storage(StoreError::Serialization(e))
    }
}
