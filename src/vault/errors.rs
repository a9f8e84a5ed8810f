//! vault::errors
//!
//! Domain-level errors for secret operations.

use thiserror::Error;

use crate::store::StoreError;

/// Errors from vault operations.
///
/// Callers branch on the variant, never on the message:
/// - `Validation`: the caller sent a bad request; do not retry
/// - `NotFound`: the secret is absent; do not retry
/// - `Store`: the object store failed; possibly transient
///
/// Messages never contain secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// A required field was missing or empty.
    #[error("invalid request: {0}")]
    Validation(String),

    /// No secret with this name exists.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The object store failed.
    #[error("secret store error: {0}")]
    Store(#[from] StoreError),
}

impl SecretError {
    /// Map a store error for an operation on `name`.
    ///
    /// Only a missing blob becomes `NotFound`. A missing container is a
    /// store failure: it means bootstrap never succeeded.
    pub(crate) fn from_store(name: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => SecretError::NotFound(name.to_string()),
            other => SecretError::Store(other),
        }
    }
}
