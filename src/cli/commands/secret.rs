//! cli::commands::secret
//!
//! One-shot secret operations: `list`, `get`, `put`, `delete`.
//!
//! With `--json`, each command prints the same body the HTTP service
//! returns for the equivalent request.
//!
//! # Example
//!
//! ```bash
//! blobvault put db-password           # prompts for the value
//! echo -n s3cr3t | blobvault put db-password
//! blobvault get db-password
//! blobvault list --json
//! ```

use std::io::{self, IsTerminal, Read};

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::open_vault;
use crate::cli::Context;
use crate::core::config::{Config, ConfigError};
use crate::server::handlers::{ListSecretsResponse, MessageResponse, SecretResponse};
use crate::store::StoreBackend;
use crate::ui::output;
use crate::vault::Vault;

/// One-shot commands need a store that outlives the process. The memory
/// backend would report a write as stored and then drop it on exit.
fn require_persistent(config: &Config) -> Result<(), ConfigError> {
    if config.backend == StoreBackend::Memory {
        return Err(ConfigError::InvalidValue(format!(
            "the {0} backend does not persist between commands; use `blobvault serve --backend {0}`",
            StoreBackend::Memory
        )));
    }
    Ok(())
}

/// Run one vault operation on a fresh runtime.
fn with_vault<T, F, Fut>(op: F) -> Result<T>
where
    F: FnOnce(Vault) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let config = Config::load()?;
    require_persistent(&config)?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let vault = open_vault(&config).await?;
        op(vault).await
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// List secret names, one per line.
pub fn list(ctx: &Context) -> Result<()> {
    let mut secrets = with_vault(|vault| async move {
        vault.list().await.context("list secrets")
    })?;
    secrets.sort();

    if ctx.json {
        return print_json(&ListSecretsResponse { secrets });
    }
    if secrets.is_empty() {
        output::print("No secrets.", ctx.verbosity);
    }
    for name in secrets {
        println!("{}", name);
    }
    Ok(())
}

/// Print a secret's value.
pub fn get(ctx: &Context, name: &str) -> Result<()> {
    let value = with_vault(|vault| async move {
        vault
            .get(name)
            .await
            .with_context(|| format!("secret '{}' not found or inaccessible", name))
    })?;

    if ctx.json {
        return print_json(&SecretResponse {
            secret_name: name.to_string(),
            value,
        });
    }
    println!("{}", value);
    Ok(())
}

/// Store a secret. Without `value`, reads it from a masked prompt on a
/// terminal, or from stdin otherwise.
pub fn put(ctx: &Context, name: &str, value: Option<String>) -> Result<()> {
    let value = match value {
        Some(v) => v,
        None => read_value(name)?,
    };

    let stored = with_vault(|vault| async move {
        vault
            .put(name, &value)
            .await
            .with_context(|| format!("failed to store secret '{}'", name))
    })?;

    let message = format!("secret '{}' stored", stored.name);
    if ctx.json {
        return print_json(&MessageResponse { message });
    }
    output::success(message, ctx.verbosity);
    Ok(())
}

/// Delete a secret.
pub fn delete(ctx: &Context, name: &str) -> Result<()> {
    let deleted = with_vault(|vault| async move {
        vault
            .delete(name)
            .await
            .with_context(|| format!("unable to delete secret '{}'", name))
    })?;

    let message = format!("secret '{}' deleted", deleted.name);
    if ctx.json {
        return print_json(&MessageResponse { message });
    }
    output::success(message, ctx.verbosity);
    Ok(())
}

fn read_value(name: &str) -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return rpassword::prompt_password(format!("Value for '{}': ", name))
            .context("Failed to read secret value");
    }

    let mut buf = String::new();
    stdin
        .lock()
        .read_to_string(&mut buf)
        .context("Failed to read secret value from stdin")?;
    Ok(strip_line_ending(buf))
}

/// Drop one trailing newline, as left by `echo` or a heredoc.
fn strip_line_ending(mut value: String) -> String {
    if value.ends_with('\n') {
        value.pop();
        if value.ends_with('\r') {
            value.pop();
        }
    }
    value
}
