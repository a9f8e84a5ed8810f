//! cli
//!
//! Command-line interface for blobvault.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Every command loads [`Config`] once, builds the
//! object store, opens the [`Vault`], and makes vault calls. Commands are
//! sync functions that run their async work on a tokio runtime they own.
//!
//! [`Config`]: crate::core::config::Config
//! [`Vault`]: crate::vault::Vault

pub mod args;
pub mod commands;

pub use args::{Cli, Command, LogFormat};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::ui::output::{self, Verbosity};

/// Output settings shared by all commands.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// Output verbosity
    pub verbosity: Verbosity,
    /// Print JSON instead of text
    pub json: bool,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let ctx = Context {
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        json: cli.json,
    };
    init_tracing(cli.log_format, cli.debug, &cli.command, ctx.verbosity);

    commands::dispatch(cli.command, &ctx)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the server logs at `info` and the
/// one-shot commands at `warn`; `--debug` raises either to `debug`. Logs go
/// to stderr so command output on stdout stays clean.
fn init_tracing(format: LogFormat, debug: bool, command: &Command, verbosity: Verbosity) {
    let default_level = match (debug, command) {
        (true, _) => "debug",
        (false, Command::Serve { .. }) => "info",
        (false, _) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // Fails only if a subscriber is already installed; that one stays
    if let Err(e) = installed {
        output::debug(format!("keeping existing tracing subscriber: {}", e), verbosity);
    }
}
