//! store::memory
//!
//! In-memory object store for deterministic testing and local runs.
//!
//! # Design
//!
//! Containers and blobs live in a map behind a mutex. The store can be told
//! to fail a specific operation, and it records every call so tests can
//! assert on what reached the store (and, more often, what did not).
//!
//! # Example
//!
//! ```
//! use blobvault::store::memory::MemoryStore;
//! use blobvault::store::{ContainerOutcome, ObjectStore};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//!
//! assert_eq!(
//!     store.create_container("vault").await.unwrap(),
//!     ContainerOutcome::Created
//! );
//! store.put_blob("vault", "db-password", b"s3cr3t".to_vec()).await.unwrap();
//!
//! let data = store.get_blob("vault", "db-password").await.unwrap();
//! assert_eq!(data, b"s3cr3t");
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{ContainerOutcome, ObjectStore, StoreError};

/// In-memory object store.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    /// Blobs by container, then by name. `BTreeMap` keeps listings sorted.
    containers: HashMap<String, BTreeMap<String, Vec<u8>>>,
    /// Operation to fail (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<StoreOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    CreateContainer(StoreError),
    ListBlobs(StoreError),
    GetBlob(StoreError),
    PutBlob(StoreError),
    DeleteBlob(StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    CreateContainer { container: String },
    ListBlobs { container: String },
    GetBlob { container: String, name: String },
    PutBlob { container: String, name: String },
    DeleteBlob { container: String, name: String },
}

impl StoreOperation {
    /// Whether this operation changes stored state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StoreOperation::CreateContainer { .. }
                | StoreOperation::PutBlob { .. }
                | StoreOperation::DeleteBlob { .. }
        )
    }
}

impl MemoryStore {
    /// Create an empty store with no containers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with an existing container holding `blobs`.
    pub fn with_container<I, K, V>(container: &str, blobs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let store = Self::new();
        {
            let mut inner = store.lock();
            inner.containers.insert(
                container.to_string(),
                blobs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            );
        }
        store
    }

    /// Configure the store to fail a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.lock().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Whether a container exists (for test verification).
    pub fn has_container(&self, container: &str) -> bool {
        self.lock().containers.contains_key(container)
    }

    /// Number of blobs in a container (for test verification).
    pub fn blob_count(&self, container: &str) -> usize {
        self.lock()
            .containers
            .get(container)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    // A panic while holding the lock cannot leave the maps half-updated,
    // so a poisoned mutex is still safe to use.
    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: StoreOperation) {
        self.lock().operations.push(op);
    }

    fn check_fail(&self, expected: &str) -> Option<StoreError> {
        let inner = self.lock();
        match &inner.fail_on {
            Some(FailOn::CreateContainer(e)) if expected == "create_container" => Some(e.clone()),
            Some(FailOn::ListBlobs(e)) if expected == "list_blobs" => Some(e.clone()),
            Some(FailOn::GetBlob(e)) if expected == "get_blob" => Some(e.clone()),
            Some(FailOn::PutBlob(e)) if expected == "put_blob" => Some(e.clone()),
            Some(FailOn::DeleteBlob(e)) if expected == "delete_blob" => Some(e.clone()),
            _ => None,
        }
    }
}

fn container_missing(container: &str) -> StoreError {
    StoreError::ContainerNotFound(container.to_string())
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_container(&self, container: &str) -> Result<ContainerOutcome, StoreError> {
        self.record(StoreOperation::CreateContainer {
            container: container.to_string(),
        });
        if let Some(e) = self.check_fail("create_container") {
            return Err(e);
        }

        let mut inner = self.lock();
        if inner.containers.contains_key(container) {
            return Ok(ContainerOutcome::AlreadyExisted);
        }
        inner
            .containers
            .insert(container.to_string(), BTreeMap::new());
        Ok(ContainerOutcome::Created)
    }

    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, StoreError> {
        self.record(StoreOperation::ListBlobs {
            container: container.to_string(),
        });
        if let Some(e) = self.check_fail("list_blobs") {
            return Err(e);
        }

        let inner = self.lock();
        let blobs = inner
            .containers
            .get(container)
            .ok_or_else(|| container_missing(container))?;
        Ok(blobs.keys().cloned().collect())
    }

    async fn get_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        self.record(StoreOperation::GetBlob {
            container: container.to_string(),
            name: name.to_string(),
        });
        if let Some(e) = self.check_fail("get_blob") {
            return Err(e);
        }

        let inner = self.lock();
        inner
            .containers
            .get(container)
            .ok_or_else(|| container_missing(container))?
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("blob '{}'", name)))
    }

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        data: Vec<u8>,
    ) -> Result<(), StoreError> {
        self.record(StoreOperation::PutBlob {
            container: container.to_string(),
            name: name.to_string(),
        });
        if let Some(e) = self.check_fail("put_blob") {
            return Err(e);
        }

        let mut inner = self.lock();
        inner
            .containers
            .get_mut(container)
            .ok_or_else(|| container_missing(container))?
            .insert(name.to_string(), data);
        Ok(())
    }

    async fn delete_blob(&self, container: &str, name: &str) -> Result<(), StoreError> {
        self.record(StoreOperation::DeleteBlob {
            container: container.to_string(),
            name: name.to_string(),
        });
        if let Some(e) = self.check_fail("delete_blob") {
            return Err(e);
        }

        let mut inner = self.lock();
        inner
            .containers
            .get_mut(container)
            .ok_or_else(|| container_missing(container))?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("blob '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_container_twice_reports_already_existed() {
        let store = MemoryStore::new();
        assert_eq!(
            store.create_container("vault").await.unwrap(),
            ContainerOutcome::Created
        );
        assert_eq!(
            store.create_container("vault").await.unwrap(),
            ContainerOutcome::AlreadyExisted
        );
    }

    #[tokio::test]
    async fn operations_on_missing_container_fail() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.list_blobs("vault").await,
            Err(StoreError::ContainerNotFound(_))
        ));
        assert!(matches!(
            store.put_blob("vault", "a", b"x".to_vec()).await,
            Err(StoreError::ContainerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let store = MemoryStore::with_container("vault", [("b", "2"), ("a", "1"), ("c", "3")]);
        assert_eq!(store.list_blobs("vault").await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn delete_missing_blob_is_not_found() {
        let store = MemoryStore::with_container("vault", Vec::<(String, Vec<u8>)>::new());
        assert!(matches!(
            store.delete_blob("vault", "nope").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn fail_on_only_affects_named_operation() {
        let store = MemoryStore::with_container("vault", [("a", "1")])
            .fail_on(FailOn::GetBlob(StoreError::Network("down".into())));

        assert!(matches!(
            store.get_blob("vault", "a").await,
            Err(StoreError::Network(_))
        ));
        assert_eq!(store.list_blobs("vault").await.unwrap(), vec!["a"]);

        store.clear_fail_on();
        assert_eq!(store.get_blob("vault", "a").await.unwrap(), b"1");
    }

    #[tokio::test]
    async fn records_operations() {
        let store = MemoryStore::new();
        store.create_container("vault").await.unwrap();
        store.put_blob("vault", "a", b"1".to_vec()).await.unwrap();
        let _ = store.get_blob("vault", "a").await;

        let ops = store.operations();
        assert_eq!(ops.len(), 3);
        assert_eq!(
            ops[1],
            StoreOperation::PutBlob {
                container: "vault".into(),
                name: "a".into()
            }
        );
        assert!(ops[1].is_mutation());
        assert!(!ops[2].is_mutation());

        store.clear_operations();
        assert!(store.operations().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        tokio_test::block_on(clone.create_container("vault")).unwrap();
        assert!(store.has_container("vault"));
        assert_eq!(store.blob_count("vault"), 0);
    }
}
