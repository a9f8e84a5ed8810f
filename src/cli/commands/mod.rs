//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration (defaults, file, environment, flags)
//! 2. Opens the vault over the configured object store
//! 3. Makes vault calls and formats the output
//!
//! Vault and store calls are async. Handlers stay sync and run them on a
//! tokio runtime they create, so `main` needs no async entry point.

mod completion;
mod secret;
mod serve;

pub use completion::completion;
pub use secret::{delete, get, list, put};
pub use serve::serve;

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::core::config::Config;
use crate::store::create_object_store;
use crate::vault::Vault;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Serve { bind, backend } => serve(ctx, bind, backend),
        Command::List => list(ctx),
        Command::Get { name } => get(ctx, &name),
        Command::Put { name, value } => put(ctx, &name, value),
        Command::Delete { name } => delete(ctx, &name),
        Command::Completion { shell } => completion(shell),
    }
}

/// Build the object store named by `config` and open a vault on it.
pub(crate) async fn open_vault(config: &Config) -> Result<Vault> {
    let store = create_object_store(config).context("configure object store")?;
    tracing::debug!(
        backend = store.name(),
        container = %config.container,
        "opening vault"
    );
    let vault = Vault::open(store, config.container.clone(), config.bootstrap)
        .await
        .with_context(|| format!("open container '{}'", config.container))?;
    Ok(vault)
}
