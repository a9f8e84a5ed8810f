//! vault::bootstrap
//!
//! Container bootstrap: make sure the vault container exists.
//!
//! # Policy
//!
//! Creating a container that already exists is success. What happens on any
//! other failure depends on [`BootstrapPolicy`]:
//!
//! - `Deferred`: log a warning and report [`Ready::Deferred`]. The first real
//!   operation then fails against the missing or inaccessible container and
//!   surfaces the store error to its caller.
//! - `Strict`: return the error now.

use crate::store::{ContainerOutcome, ObjectStore, StoreError};

use super::errors::SecretError;

/// What to do when the container cannot be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapPolicy {
    /// Swallow the failure; let the next operation report it.
    #[default]
    Deferred,
    /// Fail immediately.
    Strict,
}

impl BootstrapPolicy {
    /// Get the policy name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            BootstrapPolicy::Deferred => "deferred",
            BootstrapPolicy::Strict => "strict",
        }
    }

    /// Parse a policy from a string.
    ///
    /// # Example
    ///
    /// ```
    /// use blobvault::vault::BootstrapPolicy;
    ///
    /// assert_eq!(BootstrapPolicy::parse("strict"), Some(BootstrapPolicy::Strict));
    /// assert_eq!(BootstrapPolicy::parse("lazy"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "deferred" => Some(BootstrapPolicy::Deferred),
            "strict" => Some(BootstrapPolicy::Strict),
            _ => None,
        }
    }
}

impl std::fmt::Display for BootstrapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The container is ready for use (or assumed to be).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ready {
    /// This call created the container.
    Created,
    /// The container was already there.
    AlreadyExisted,
    /// Creation failed and the failure was deferred.
    Deferred(StoreError),
}

impl Ready {
    /// Whether the container is known to exist.
    pub fn is_confirmed(&self) -> bool {
        !matches!(self, Ready::Deferred(_))
    }
}

impl From<ContainerOutcome> for Ready {
    fn from(outcome: ContainerOutcome) -> Self {
        match outcome {
            ContainerOutcome::Created => Ready::Created,
            ContainerOutcome::AlreadyExisted => Ready::AlreadyExisted,
        }
    }
}

/// Ensure `container` exists.
///
/// Idempotent: safe to call before every operation.
///
/// # Errors
///
/// Only under [`BootstrapPolicy::Strict`], with `SecretError::Store`.
pub async fn ensure_namespace(
    store: &dyn ObjectStore,
    container: &str,
    policy: BootstrapPolicy,
) -> Result<Ready, SecretError> {
    match store.create_container(container).await {
        Ok(outcome) => {
            tracing::debug!(container, %outcome, "vault container ready");
            Ok(outcome.into())
        }
        // Backends that report the conflict as an error
        Err(StoreError::AlreadyExists(_)) => Ok(Ready::AlreadyExisted),
        Err(e) => match policy {
            BootstrapPolicy::Deferred => {
                tracing::warn!(container, error = %e, "container bootstrap failed; deferring");
                Ok(Ready::Deferred(e))
            }
            BootstrapPolicy::Strict => Err(SecretError::Store(e)),
        },
    }
}
