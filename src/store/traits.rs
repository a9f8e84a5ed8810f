//! store::traits
//!
//! Object store trait definition for container-namespaced blob storage.
//!
//! # Design
//!
//! The `ObjectStore` trait is async because every operation involves network
//! I/O for real backends. All methods return `Result` so the vault layer can
//! translate store outcomes into domain outcomes.
//!
//! Implementations:
//! - Do not retry. A failure is reported once, as it happened.
//! - Report "container already exists" as a successful [`ContainerOutcome`],
//!   never as an error.
//! - Report a missing blob as [`StoreError::NotFound`].
//!
//! # Example
//!
//! ```ignore
//! use blobvault::store::{ObjectStore, StoreError};
//!
//! async fn read(store: &dyn ObjectStore) -> Result<Vec<u8>, StoreError> {
//!     store.create_container("vault").await?;
//!     store.get_blob("vault", "db-password").await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from object store operations.
///
/// Messages describe the failure but never include blob contents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The blob does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The container does not exist.
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// The container already exists.
    ///
    /// Only returned by backends that cannot express this as a
    /// [`ContainerOutcome`]; the bundled backends never return it.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The credential was rejected or lacks permission.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The service returned an unexpected status.
    #[error("API error: {status} {code} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Service error code (e.g. `InternalError`), or empty
        code: String,
        /// Error message from the service
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The service replied with something we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result of a container creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerOutcome {
    /// The container was created by this call.
    Created,
    /// The container was already there.
    AlreadyExisted,
}

impl std::fmt::Display for ContainerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerOutcome::Created => write!(f, "created"),
            ContainerOutcome::AlreadyExisted => write!(f, "already existed"),
        }
    }
}

/// Durable key/blob storage with per-container namespacing.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single instance is shared by all
/// request handlers.
///
/// # Error Handling
///
/// - `NotFound`: the blob does not exist (get, delete)
/// - `ContainerNotFound`: the container itself is missing
/// - `AuthFailed`: credential rejected
/// - `Api` / `Network` / `InvalidResponse`: anything else
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get the backend name (e.g., "azure", "memory").
    fn name(&self) -> &'static str;

    /// Create a container if it does not exist.
    ///
    /// # Returns
    ///
    /// `Created` or `AlreadyExisted`. Both mean the container is usable.
    async fn create_container(&self, container: &str) -> Result<ContainerOutcome, StoreError>;

    /// List the names of all blobs in a container.
    ///
    /// Order is whatever the backend enumerates. An empty container yields an
    /// empty vector.
    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, StoreError>;

    /// Download the full contents of a blob.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the blob does not exist
    async fn get_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Upload a blob, replacing any existing contents.
    ///
    /// Returns only after the backend acknowledged the write.
    async fn put_blob(&self, container: &str, name: &str, data: Vec<u8>)
        -> Result<(), StoreError>;

    /// Delete a blob.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the blob does not exist
    async fn delete_blob(&self, container: &str, name: &str) -> Result<(), StoreError>;
}
