//! store
//!
//! Abstraction over container-namespaced object storage.
//!
//! # Architecture
//!
//! The `ObjectStore` trait is the only seam between the vault and durable
//! storage. The vault never imports a backend directly; it receives an
//! `Arc<dyn ObjectStore>` built by [`create_object_store`].
//!
//! # Modules
//!
//! - `traits`: Core `ObjectStore` trait, `StoreError`, `ContainerOutcome`
//! - [`azure`]: Azure Blob Storage over the REST API
//! - [`memory`]: In-memory store for deterministic testing
//! - `factory`: Backend selection from configuration

pub mod azure;
mod factory;
pub mod memory;
mod traits;

pub use factory::{create_object_store, valid_backend_names, StoreBackend};
pub use traits::*;
