//! Persistence error type shared by all store ports.

use thiserror::Error;

/// Errors surfaced by the backing store.
///
/// `DuplicateReference` is distinguished so callers can recover from
/// insert races on the provider-reference uniqueness constraint by
/// re-querying instead of failing the request.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A uniqueness constraint on the provider reference was violated.
    #[error("duplicate provider reference '{reference}'")]
    DuplicateReference { reference: String },

    /// The targeted row does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn duplicate_reference(reference: impl Into<String>) -> Self {
        StoreError::DuplicateReference {
            reference: reference.into(),
        }
    }

    pub fn not_found(entity: &'static str) -> Self {
        StoreError::NotFound { entity }
    }

    pub fn database(message: impl Into<String>) -> Self {
        StoreError::Database(message.into())
    }

    /// True when the error is the duplicate-reference conflict that the
    /// payment locator recovers from.
    pub fn is_duplicate_reference(&self) -> bool {
        matches!(self, StoreError::DuplicateReference { .. })
    }
}
