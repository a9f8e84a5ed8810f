//! blobvault - named secrets kept as blobs in an object-storage container
//!
//! A secret is a short UTF-8 value stored under a name. Every secret lives
//! as one blob in a single container; the container is created on first use.
//! The crate ships an HTTP service and a CLI over the same vault.
//!
//! # Architecture
//!
//! - [`store`] - Object-store abstraction with Azure Blob and in-memory backends
//! - [`vault`] - Secret operations, validation, and container bootstrap
//! - [`server`] - HTTP routes and error mapping
//! - [`core`] - Configuration loading
//! - [`cli`] - Command-line interface (parses args, delegates to the vault)
//! - [`ui`] - CLI output helpers
//!
//! # Invariants
//!
//! 1. A secret's name is its blob name; no other blobs are written
//! 2. Name and value are validated before any store call
//! 3. Store failures are never reported as a missing secret

pub mod cli;
pub mod core;
pub mod server;
pub mod store;
pub mod ui;
pub mod vault;
