//! store::factory
//!
//! Object store backend selection and creation.
//!
//! # Design
//!
//! Callers use [`create_object_store`] instead of constructing a specific
//! backend, so the backend choice lives in configuration only.

use std::sync::Arc;

use super::azure::AzureBlobStore;
use super::memory::MemoryStore;
use super::traits::ObjectStore;
use crate::core::config::{Config, ConfigError};

/// Supported object store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Azure Blob Storage
    #[default]
    Azure,
    /// Process-local memory (contents are lost on exit)
    Memory,
}

impl StoreBackend {
    /// Get all available backends.
    pub fn all() -> &'static [StoreBackend] {
        &[StoreBackend::Azure, StoreBackend::Memory]
    }

    /// Get the backend name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Azure => "azure",
            StoreBackend::Memory => "memory",
        }
    }

    /// Parse a backend from a string.
    ///
    /// # Example
    ///
    /// ```
    /// use blobvault::store::StoreBackend;
    ///
    /// assert_eq!(StoreBackend::parse("Azure"), Some(StoreBackend::Azure));
    /// assert_eq!(StoreBackend::parse("s3"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "azure" => Some(StoreBackend::Azure),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Get the names of all valid backends.
pub fn valid_backend_names() -> Vec<&'static str> {
    StoreBackend::all().iter().map(|b| b.name()).collect()
}

/// Create the object store selected by `config`.
///
/// # Errors
///
/// `ConfigError::MissingValue` if the azure backend lacks its credentials.
/// A validated [`Config`] never hits this.
pub fn create_object_store(config: &Config) -> Result<Arc<dyn ObjectStore>, ConfigError> {
    match config.backend {
        StoreBackend::Azure => {
            let sas_token = config
                .azure
                .sas_token
                .as_deref()
                .ok_or(ConfigError::MissingValue("AZURE_SAS_TOKEN"))?;
            let endpoint = config
                .azure
                .blob_endpoint()
                .ok_or(ConfigError::MissingValue("AZURE_STORAGE_ACCOUNT"))?;
            tracing::debug!(%endpoint, "using azure blob store");
            Ok(Arc::new(AzureBlobStore::with_endpoint(endpoint, sas_token)))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; secrets are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AzureSettings;

    #[test]
    fn backend_names_round_trip() {
        for backend in StoreBackend::all() {
            assert_eq!(StoreBackend::parse(backend.name()), Some(*backend));
            assert_eq!(backend.to_string(), backend.name());
        }
    }

    #[test]
    fn valid_names() {
        assert_eq!(valid_backend_names(), vec!["azure", "memory"]);
    }

    #[test]
    fn default_backend_is_azure() {
        assert_eq!(StoreBackend::default(), StoreBackend::Azure);
    }

    #[test]
    fn creates_memory_store() {
        let config = Config {
            backend: StoreBackend::Memory,
            ..Config::default()
        };
        let store = create_object_store(&config).expect("memory store");
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn creates_azure_store() {
        let config = Config {
            backend: StoreBackend::Azure,
            azure: AzureSettings {
                account: Some("acct".into()),
                sas_token: Some("sig=x".into()),
                endpoint: None,
            },
            ..Config::default()
        };
        let store = create_object_store(&config).expect("azure store");
        assert_eq!(store.name(), "azure");
    }

    #[test]
    fn azure_without_sas_token_fails() {
        let config = Config {
            backend: StoreBackend::Azure,
            azure: AzureSettings {
                account: Some("acct".into()),
                sas_token: None,
                endpoint: None,
            },
            ..Config::default()
        };
        match create_object_store(&config) {
            Err(ConfigError::MissingValue(name)) => assert_eq!(name, "AZURE_SAS_TOKEN"),
            Err(e) => panic!("unexpected error: {:?}", e),
            Ok(_) => panic!("expected error"),
        }
    }
}
