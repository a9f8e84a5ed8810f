//! vault::secret_store
//!
//! The `Vault` handle: named text secrets stored as blobs.
//!
//! # Semantics
//!
//! - A secret is exactly a (name, value) pair. Its whole state is the blob.
//! - `put` is both create and update. Last writer wins; there is no
//!   versioning and no conflict detection.
//! - `delete` of an absent secret is `NotFound`, including a repeated delete.
//! - Nothing is cached. Every call goes to the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::store::ObjectStore;

use super::bootstrap::{ensure_namespace, BootstrapPolicy};
use super::errors::SecretError;

/// A secret was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    pub name: String,
}

/// A secret was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub name: String,
}

/// Secret store over a single container.
///
/// Cheap to share behind `Arc`; all methods take `&self`.
pub struct Vault {
    store: Arc<dyn ObjectStore>,
    container: String,
    policy: BootstrapPolicy,
    /// Set once a bootstrap confirmed the container exists.
    bootstrapped: AtomicBool,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("store", &self.store.name())
            .field("container", &self.container)
            .field("policy", &self.policy)
            .field("bootstrapped", &self.bootstrapped.load(Ordering::Acquire))
            .finish()
    }
}

impl Vault {
    /// Open a vault, bootstrapping its container first.
    ///
    /// # Errors
    ///
    /// `SecretError::Store` if bootstrap fails under
    /// [`BootstrapPolicy::Strict`]. Under `Deferred` this never fails.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use blobvault::store::memory::MemoryStore;
    /// use blobvault::vault::{BootstrapPolicy, Vault};
    ///
    /// # tokio_test::block_on(async {
    /// let vault = Vault::open(Arc::new(MemoryStore::new()), "vault", BootstrapPolicy::Strict)
    ///     .await
    ///     .unwrap();
    ///
    /// vault.put("db-password", "s3cr3t").await.unwrap();
    /// assert_eq!(vault.get("db-password").await.unwrap(), "s3cr3t");
    /// # });
    /// ```
    pub async fn open(
        store: Arc<dyn ObjectStore>,
        container: impl Into<String>,
        policy: BootstrapPolicy,
    ) -> Result<Self, SecretError> {
        let vault = Self {
            store,
            container: container.into(),
            policy,
            bootstrapped: AtomicBool::new(false),
        };
        vault.ready().await?;
        Ok(vault)
    }

    /// Get the container name.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Get the bootstrap policy.
    pub fn policy(&self) -> BootstrapPolicy {
        self.policy
    }

    /// Whether bootstrap has confirmed the container exists.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::Acquire)
    }

    /// Bootstrap unless a previous call already confirmed the container.
    ///
    /// After a deferred failure the flag stays unset, so the next operation
    /// tries again.
    async fn ready(&self) -> Result<(), SecretError> {
        if self.is_bootstrapped() {
            return Ok(());
        }
        let ready = ensure_namespace(self.store.as_ref(), &self.container, self.policy).await?;
        if ready.is_confirmed() {
            self.bootstrapped.store(true, Ordering::Release);
        }
        Ok(())
    }

    /// List all secret names.
    ///
    /// Order is whatever the store enumerates. An empty vault yields an
    /// empty vector.
    pub async fn list(&self) -> Result<Vec<String>, SecretError> {
        self.ready().await?;
        let names = self.store.list_blobs(&self.container).await?;
        tracing::debug!(count = names.len(), "listed secrets");
        Ok(names)
    }

    /// Get a secret's value.
    ///
    /// The stored bytes are decoded as UTF-8; invalid sequences are replaced.
    ///
    /// # Errors
    ///
    /// - `Validation` if `name` is empty, `.` or `..`
    /// - `NotFound` if no such secret exists
    /// - `Store` for any other failure
    pub async fn get(&self, name: &str) -> Result<String, SecretError> {
        require_name(name)?;
        self.ready().await?;

        let data = self
            .store
            .get_blob(&self.container, name)
            .await
            .map_err(|e| SecretError::from_store(name, e))?;
        tracing::debug!(secret = name, "read secret");
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Store a secret, overwriting any existing value.
    ///
    /// # Errors
    ///
    /// - `Validation` if `name` is empty, `.` or `..`, or `value` is empty;
    ///   the store is not touched
    /// - `Store` if the write was not acknowledged
    pub async fn put(&self, name: &str, value: &str) -> Result<Stored, SecretError> {
        require_name(name)?;
        require("value", value)?;
        self.ready().await?;

        self.store
            .put_blob(&self.container, name, value.as_bytes().to_vec())
            .await?;
        tracing::info!(secret = name, "stored secret");
        Ok(Stored {
            name: name.to_string(),
        })
    }

    /// Delete a secret.
    ///
    /// # Errors
    ///
    /// - `Validation` if `name` is empty, `.` or `..`
    /// - `NotFound` if no such secret exists (also on a repeated delete)
    /// - `Store` for any other failure
    pub async fn delete(&self, name: &str) -> Result<Deleted, SecretError> {
        require_name(name)?;
        self.ready().await?;

        self.store
            .delete_blob(&self.container, name)
            .await
            .map_err(|e| SecretError::from_store(name, e))?;
        tracing::info!(secret = name, "deleted secret");
        Ok(Deleted {
            name: name.to_string(),
        })
    }
}

/// Names become URL path segments, so `.` and `..` would address the
/// container or the account instead of a blob.
fn require_name(name: &str) -> Result<(), SecretError> {
    require("name", name)?;
    if name == "." || name == ".." {
        return Err(SecretError::Validation(format!(
            "secret name '{}' is not allowed",
            name
        )));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<(), SecretError> {
    if value.is_empty() {
        Err(SecretError::Validation(format!(
            "secret {} is required",
            field
        )))
    } else {
        Ok(())
    }
}
