//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$BLOBVAULT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/blobvault/config.toml`
//! 3. `~/.blobvault/config.toml`
//!
//! # Validation
//!
//! Names (backend, bootstrap policy) are validated after parsing. Unknown
//! keys are rejected at parse time.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::store::{valid_backend_names, StoreBackend};
use crate::vault::BootstrapPolicy;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// backend = "azure"
/// container = "vault"
/// bootstrap = "deferred"
///
/// [azure]
/// account = "myaccount"
/// sas_token = "sv=2022-11-02&ss=b&srt=co&sp=rwdlc&sig=..."
///
/// [server]
/// bind = "0.0.0.0:5000"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Object store backend ("azure" or "memory")
    pub backend: Option<String>,

    /// Container holding the secrets
    pub container: Option<String>,

    /// Bootstrap failure policy ("deferred" or "strict")
    pub bootstrap: Option<String>,

    /// Azure Blob Storage settings
    pub azure: Option<AzureFileConfig>,

    /// HTTP server settings
    pub server: Option<ServerFileConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(backend) = &self.backend {
            parse_backend(backend)?;
        }
        if let Some(policy) = &self.bootstrap {
            parse_policy(policy)?;
        }
        Ok(())
    }
}

/// `[azure]` section.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AzureFileConfig {
    /// Storage account name
    pub account: Option<String>,

    /// Shared access signature, with or without leading `?`
    pub sas_token: Option<String>,

    /// Blob endpoint override (e.g. `http://127.0.0.1:10000/devstoreaccount1`)
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for AzureFileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureFileConfig")
            .field("account", &self.account)
            .field("has_sas_token", &self.sas_token.is_some())
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerFileConfig {
    /// Listen address, e.g. `127.0.0.1:5000`
    pub bind: Option<String>,
}

/// Parse a backend name, listing valid names on failure.
pub(crate) fn parse_backend(s: &str) -> Result<StoreBackend, ConfigError> {
    StoreBackend::parse(s).ok_or_else(|| {
        ConfigError::InvalidValue(format!(
            "invalid backend '{}', must be one of: {}",
            s,
            valid_backend_names().join(", ")
        ))
    })
}

/// Parse a bootstrap policy name.
pub(crate) fn parse_policy(s: &str) -> Result<BootstrapPolicy, ConfigError> {
    BootstrapPolicy::parse(s).ok_or_else(|| {
        ConfigError::InvalidValue(format!(
            "invalid bootstrap policy '{}', must be one of: deferred, strict",
            s
        ))
    })
}
