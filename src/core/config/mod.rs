//! core::config
//!
//! Configuration loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file (see [`schema`] for locations)
//! 3. Environment variables
//! 4. CLI flags, via [`Config::with_overrides`]
//!
//! # Environment
//!
//! | Variable                  | Meaning                                  |
//! |---------------------------|------------------------------------------|
//! | `AZURE_STORAGE_ACCOUNT`   | Storage account name                     |
//! | `AZURE_SAS_TOKEN`         | Shared access signature                  |
//! | `BLOBVAULT_BLOB_ENDPOINT` | Blob endpoint override                   |
//! | `BLOBVAULT_CONTAINER`     | Container name (default `vault`)         |
//! | `BLOBVAULT_BACKEND`       | `azure` (default) or `memory`            |
//! | `BLOBVAULT_BOOTSTRAP`     | `deferred` (default) or `strict`         |
//! | `BLOBVAULT_BIND`          | Listen address (default `127.0.0.1:5000`)|
//!
//! Empty variables count as unset.
//!
//! Configuration is read once, at process start. Missing required values
//! are a startup error, never a per-request one.
//!
//! # Example
//!
//! ```no_run
//! use blobvault::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("container: {}", config.container);
//! println!("backend: {}", config.backend);
//! ```

pub mod schema;

pub use schema::{AzureFileConfig, FileConfig, ServerFileConfig};

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::store::azure::default_endpoint;
use crate::store::StoreBackend;
use crate::vault::{BootstrapPolicy, DEFAULT_CONTAINER};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "BLOBVAULT_CONFIG";
pub const ACCOUNT_ENV: &str = "AZURE_STORAGE_ACCOUNT";
pub const SAS_TOKEN_ENV: &str = "AZURE_SAS_TOKEN";
pub const ENDPOINT_ENV: &str = "BLOBVAULT_BLOB_ENDPOINT";
pub const CONTAINER_ENV: &str = "BLOBVAULT_CONTAINER";
pub const BACKEND_ENV: &str = "BLOBVAULT_BACKEND";
pub const BOOTSTRAP_ENV: &str = "BLOBVAULT_BOOTSTRAP";
pub const BIND_ENV: &str = "BLOBVAULT_BIND";

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("missing required config value: {0}")]
    MissingValue(&'static str),
}

/// Azure connection settings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AzureSettings {
    /// Storage account name
    pub account: Option<String>,
    /// Shared access signature
    pub sas_token: Option<String>,
    /// Blob endpoint override
    pub endpoint: Option<String>,
}

impl AzureSettings {
    /// The blob endpoint: the override if set, else derived from the account.
    pub fn blob_endpoint(&self) -> Option<String> {
        self.endpoint
            .clone()
            .or_else(|| self.account.as_deref().map(default_endpoint))
    }
}

// Custom Debug to avoid exposing the SAS token
impl std::fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSettings")
            .field("account", &self.account)
            .field("has_sas_token", &self.sas_token.is_some())
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Object store backend
    pub backend: StoreBackend,
    /// Container holding the secrets
    pub container: String,
    /// Bootstrap failure policy
    pub bootstrap: BootstrapPolicy,
    /// Azure connection settings
    pub azure: AzureSettings,
    /// HTTP listen address
    pub bind: SocketAddr,
    /// Config file that was loaded, if any
    pub(crate) source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            container: DEFAULT_CONTAINER.to_string(),
            bootstrap: BootstrapPolicy::default(),
            azure: AzureSettings::default(),
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            source: None,
        }
    }
}

impl Config {
    /// Load configuration from the default file locations and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, or if
    /// the result does not validate. A missing config file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        let file = Self::find_config_file(&env);
        Self::from_sources(file.as_deref(), env)
    }

    /// Build configuration from an optional file and an environment lookup.
    ///
    /// `env` returns the value of a variable, or `None` if unset.
    pub fn from_sources<F>(file: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = file {
            let contents = Self::read_config_file(path)?;
            config.apply_file(contents)?;
            config.source = Some(path.to_path_buf());
        }

        config.apply_env(|key| env(key).filter(|v| !v.trim().is_empty()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI flag overrides and re-validate.
    pub fn with_overrides(
        mut self,
        bind: Option<SocketAddr>,
        backend: Option<StoreBackend>,
    ) -> Result<Self, ConfigError> {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self.validate()?;
        Ok(self)
    }

    /// Path of the config file that was loaded, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Find the config file to load.
    ///
    /// An explicit `$BLOBVAULT_CONFIG` is returned even if the file is
    /// missing, so the read error names it.
    fn find_config_file<F>(env: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Check $BLOBVAULT_CONFIG
        if let Some(path) = env(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }

        // 2. Check $XDG_CONFIG_HOME/blobvault/config.toml
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("blobvault/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.blobvault/config.toml
        dirs::home_dir()
            .map(|home| home.join(".blobvault/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    pub fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: FileConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(backend) = file.backend {
            self.backend = schema::parse_backend(&backend)?;
        }
        if let Some(container) = file.container {
            self.container = container;
        }
        if let Some(policy) = file.bootstrap {
            self.bootstrap = schema::parse_policy(&policy)?;
        }
        if let Some(azure) = file.azure {
            self.azure.account = azure.account.or(self.azure.account.take());
            self.azure.sas_token = azure.sas_token.or(self.azure.sas_token.take());
            self.azure.endpoint = azure.endpoint.or(self.azure.endpoint.take());
        }
        if let Some(bind) = file.server.and_then(|s| s.bind) {
            self.bind = parse_bind(&bind)?;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(account) = env(ACCOUNT_ENV) {
            self.azure.account = Some(account);
        }
        if let Some(token) = env(SAS_TOKEN_ENV) {
            self.azure.sas_token = Some(token);
        }
        if let Some(endpoint) = env(ENDPOINT_ENV) {
            self.azure.endpoint = Some(endpoint);
        }
        if let Some(container) = env(CONTAINER_ENV) {
            self.container = container;
        }
        if let Some(backend) = env(BACKEND_ENV) {
            self.backend = schema::parse_backend(&backend)?;
        }
        if let Some(policy) = env(BOOTSTRAP_ENV) {
            self.bootstrap = schema::parse_policy(&policy)?;
        }
        if let Some(bind) = env(BIND_ENV) {
            self.bind = parse_bind(&bind)?;
        }
        Ok(())
    }

    /// Validate the resolved configuration.
    ///
    /// # Errors
    ///
    /// - `MissingValue` if the azure backend lacks an account (and endpoint
    ///   override) or a SAS token
    /// - `InvalidValue` if the container name is not a valid container name
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_container_name(&self.container)?;

        if self.backend == StoreBackend::Azure {
            if self.azure.blob_endpoint().is_none() {
                return Err(ConfigError::MissingValue(ACCOUNT_ENV));
            }
            if self.azure.sas_token.is_none() {
                return Err(ConfigError::MissingValue(SAS_TOKEN_ENV));
            }
        }
        Ok(())
    }
}

fn parse_bind(s: &str) -> Result<SocketAddr, ConfigError> {
    s.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("invalid bind address '{}'", s)))
}

/// Check a container name against the Azure naming rules.
///
/// 3 to 63 characters of lowercase letters, digits and hyphens. Must start
/// and end with a letter or digit, and must not contain `--`.
///
/// # Example
///
/// ```
/// use blobvault::core::config::validate_container_name;
///
/// assert!(validate_container_name("vault").is_ok());
/// assert!(validate_container_name("My_Vault").is_err());
/// ```
pub fn validate_container_name(name: &str) -> Result<(), ConfigError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_ends = !name.starts_with('-') && !name.ends_with('-');

    if (3..=63).contains(&name.len()) && valid_chars && valid_ends && !name.contains("--") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "invalid container name '{}': use 3-63 lowercase letters, digits or single hyphens",
            name
        )))
    }
}
