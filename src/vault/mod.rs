//! vault
//!
//! Named text secrets stored as blobs in a single container.
//!
//! # Architecture
//!
//! - [`Vault`]: the secret store handle (list / get / put / delete)
//! - `bootstrap`: ensures the container exists before any operation
//! - `errors`: the `Validation` / `NotFound` / `Store` taxonomy
//!
//! A `Vault` is obtained only through [`Vault::open`], which bootstraps the
//! container first. Operations re-run bootstrap until one succeeds, so a
//! vault opened under [`BootstrapPolicy::Deferred`] recovers once the store
//! does.
//!
//! # Security
//!
//! - Secret values are never logged or included in error messages
//! - Names are logged; do not put sensitive data in names
//!
//! # Example
//!
//! ```ignore
//! use blobvault::store::create_object_store;
//! use blobvault::vault::Vault;
//!
//! let store = create_object_store(&config)?;
//! let vault = Vault::open(store, &config.container, config.bootstrap).await?;
//!
//! vault.put("db-password", "s3cr3t").await?;
//! let value = vault.get("db-password").await?;
//! vault.delete("db-password").await?;
//! ```

mod bootstrap;
mod errors;
mod secret_store;

pub use bootstrap::{ensure_namespace, BootstrapPolicy, Ready};
pub use errors::SecretError;
pub use secret_store::{Deleted, Stored, Vault};

/// Default container name.
pub const DEFAULT_CONTAINER: &str = "vault";
