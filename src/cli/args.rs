//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--log-format <text|json>`: Log line format (logs go to stderr)
//! - `--json`: Machine-readable command output
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;

use crate::store::{valid_backend_names, StoreBackend};

/// blobvault - named secrets in an object-storage container
#[derive(Parser, Debug)]
#[command(name = "blobvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Print command output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Log line format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service
    #[command(
        after_help = "\
EXAMPLES:
    # Serve the container named by the environment
    AZURE_STORAGE_ACCOUNT=myaccount AZURE_SAS_TOKEN='sv=...' blobvault serve

    # Throwaway local instance
    blobvault serve --backend memory --bind 127.0.0.1:8080"
    )]
    Serve {
        /// Listen address (overrides BLOBVAULT_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Object store backend (overrides BLOBVAULT_BACKEND)
        #[arg(long, value_parser = parse_backend)]
        backend: Option<StoreBackend>,
    },

    /// List secret names
    List,

    /// Print a secret's value
    Get {
        /// Secret name
        name: String,
    },

    /// Store a secret, replacing any existing value
    Put {
        /// Secret name
        name: String,

        /// Secret value; prompted for (or read from stdin) when omitted
        value: Option<String>,
    },

    /// Delete a secret
    Delete {
        /// Secret name
        name: String,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn parse_backend(s: &str) -> Result<StoreBackend, String> {
    StoreBackend::parse(s).ok_or_else(|| {
        format!(
            "unknown backend '{}' (valid: {})",
            s,
            valid_backend_names().join(", ")
        )
    })
}
