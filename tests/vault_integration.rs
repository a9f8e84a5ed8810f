//! Integration tests for the vault over the in-memory store.
//!
//! These tests exercise the public `Vault` API end to end: bootstrap,
//! the four secret operations, and their failure modes.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use blobvault::store::memory::{FailOn, MemoryStore, StoreOperation};
use blobvault::store::StoreError;
use blobvault::vault::{BootstrapPolicy, SecretError, Vault, DEFAULT_CONTAINER};

async fn open(store: &MemoryStore) -> Vault {
    Vault::open(
        Arc::new(store.clone()),
        DEFAULT_CONTAINER,
        BootstrapPolicy::Deferred,
    )
    .await
    .unwrap()
}

// =============================================================================
// Secret lifecycle
// =============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_get() {
        let store = MemoryStore::new();
        let vault = open(&store).await;

        vault.put("db-password", "s3cr3t").await.unwrap();
        assert_eq!(vault.get("db-password").await.unwrap(), "s3cr3t");

        let deleted = vault.delete("db-password").await.unwrap();
        assert_eq!(deleted.name, "db-password");

        let err = vault.get("db-password").await.unwrap_err();
        assert!(matches!(err, SecretError::NotFound(ref n) if n == "db-password"));
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = MemoryStore::new();
        let vault = open(&store).await;

        vault.put("api-key", "v1").await.unwrap();
        vault.put("api-key", "v2").await.unwrap();

        assert_eq!(vault.get("api-key").await.unwrap(), "v2");
        assert_eq!(vault.list().await.unwrap(), vec!["api-key"]);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let store = MemoryStore::new();
        let vault = open(&store).await;

        vault.put("token", "t").await.unwrap();
        vault.delete("token").await.unwrap();

        let err = vault.delete("token").await.unwrap_err();
        assert!(matches!(err, SecretError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_empty_vault() {
        let store = MemoryStore::new();
        let vault = open(&store).await;
        assert!(vault.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_reflects_existing_blobs() {
        let store = MemoryStore::with_container(
            DEFAULT_CONTAINER,
            [("a", "1"), ("b", "2"), ("c", "3")],
        );
        let vault = open(&store).await;

        let names: BTreeSet<String> = vault.list().await.unwrap().into_iter().collect();
        assert_eq!(names, BTreeSet::from(["a", "b", "c"].map(String::from)));
    }

    #[tokio::test]
    async fn list_after_delete() {
        let store = MemoryStore::new();
        let vault = open(&store).await;
        for name in ["a", "b", "c"] {
            vault.put(name, "v").await.unwrap();
        }
        vault.delete("b").await.unwrap();

        let names: BTreeSet<String> = vault.list().await.unwrap().into_iter().collect();
        assert_eq!(names, BTreeSet::from(["a", "c"].map(String::from)));
    }

    #[tokio::test]
    async fn unicode_round_trip() {
        let store = MemoryStore::new();
        let vault = open(&store).await;

        vault.put("greeting", "héllo wörld ✓").await.unwrap();
        assert_eq!(vault.get("greeting").await.unwrap(), "héllo wörld ✓");
    }

    #[tokio::test]
    async fn concurrent_puts_all_land() {
        let store = MemoryStore::new();
        let vault = Arc::new(open(&store).await);

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let vault = Arc::clone(&vault);
                tokio::spawn(async move {
                    vault
                        .put(&format!("secret-{}", i), &format!("value-{}", i))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(vault.list().await.unwrap().len(), 16);
        assert_eq!(vault.get("secret-7").await.unwrap(), "value-7");
    }
}

// =============================================================================
// Validation
// =============================================================================

mod validation {
    use super::*;

    #[tokio::test]
    async fn rejected_requests_never_reach_the_store() {
        let store = MemoryStore::new();
        let vault = open(&store).await;
        store.clear_operations();

        assert!(matches!(
            vault.put("", "value").await,
            Err(SecretError::Validation(_))
        ));
        assert!(matches!(
            vault.put("name", "").await,
            Err(SecretError::Validation(_))
        ));
        assert!(matches!(vault.get("").await, Err(SecretError::Validation(_))));
        assert!(matches!(
            vault.delete("").await,
            Err(SecretError::Validation(_))
        ));

        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn validation_message_names_the_field() {
        let store = MemoryStore::new();
        let vault = open(&store).await;

        let err = vault.put("name", "").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid request: secret value is required");
    }
}

// =============================================================================
// Bootstrap and store failures
// =============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn open_bootstraps_once() {
        let store = MemoryStore::new();
        let vault = open(&store).await;
        vault.list().await.unwrap();
        vault.put("a", "1").await.unwrap();

        let creates = store
            .operations()
            .into_iter()
            .filter(|op| matches!(op, StoreOperation::CreateContainer { .. }))
            .count();
        assert_eq!(creates, 1);
        assert!(store.has_container(DEFAULT_CONTAINER));
    }

    #[tokio::test]
    async fn deferred_bootstrap_recovers() {
        let store = MemoryStore::new().fail_on(FailOn::CreateContainer(StoreError::Network(
            "connection reset".into(),
        )));
        let vault = open(&store).await;
        assert!(!vault.is_bootstrapped());

        store.clear_fail_on();
        vault.put("a", "1").await.unwrap();
        assert!(vault.is_bootstrapped());
        assert_eq!(vault.get("a").await.unwrap(), "1");
    }

    #[tokio::test]
    async fn strict_bootstrap_fails_open() {
        let store = MemoryStore::new().fail_on(FailOn::CreateContainer(StoreError::AuthFailed(
            "bad signature".into(),
        )));
        let result = Vault::open(
            Arc::new(store.clone()),
            DEFAULT_CONTAINER,
            BootstrapPolicy::Strict,
        )
        .await;

        assert!(matches!(
            result,
            Err(SecretError::Store(StoreError::AuthFailed(_)))
        ));
    }

    #[tokio::test]
    async fn list_failure_is_store_error() {
        let store = MemoryStore::new();
        let vault = open(&store).await;
        let store = store.fail_on(FailOn::ListBlobs(StoreError::Network("timeout".into())));

        let err = vault.list().await.unwrap_err();
        assert!(matches!(err, SecretError::Store(StoreError::Network(_))));
        store.clear_fail_on();
    }

    #[tokio::test]
    async fn delete_failure_is_not_reported_as_missing() {
        let store = MemoryStore::new();
        let vault = open(&store).await;
        vault.put("a", "1").await.unwrap();
        let _store = store.fail_on(FailOn::DeleteBlob(StoreError::Api {
            status: 500,
            code: "InternalError".into(),
            message: "boom".into(),
        }));

        let err = vault.delete("a").await.unwrap_err();
        assert!(matches!(err, SecretError::Store(StoreError::Api { .. })));
    }

    #[tokio::test]
    async fn failed_put_leaves_previous_value() {
        let store = MemoryStore::new();
        let vault = open(&store).await;
        vault.put("a", "old").await.unwrap();

        let store = store.fail_on(FailOn::PutBlob(StoreError::Network("reset".into())));
        assert!(vault.put("a", "new").await.is_err());
        store.clear_fail_on();

        assert_eq!(vault.get("a").await.unwrap(), "old");
    }
}

// =============================================================================
// Properties
// =============================================================================

fn secret_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9._-]{0,40}"
}

fn secret_value() -> impl Strategy<Value = String> {
    "\\PC{1,64}"
}

proptest! {
    #[test]
    fn put_then_get_returns_value(name in secret_name(), value in secret_value()) {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let vault = open(&store).await;
            vault.put(&name, &value).await.unwrap();
            prop_assert_eq!(vault.get(&name).await.unwrap(), value);
            Ok(())
        })?;
    }

    #[test]
    fn list_is_the_set_of_live_names(
        puts in prop::collection::vec((secret_name(), secret_value()), 0..12),
        delete_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let vault = open(&store).await;

            let mut live = BTreeSet::new();
            for (name, value) in &puts {
                vault.put(name, value).await.unwrap();
                live.insert(name.clone());
            }
            let names: Vec<String> = live.iter().cloned().collect();
            for (name, delete) in names.iter().zip(delete_mask.iter()) {
                if *delete {
                    vault.delete(name).await.unwrap();
                    live.remove(name);
                }
            }

            let listed: BTreeSet<String> = vault.list().await.unwrap().into_iter().collect();
            prop_assert_eq!(listed, live);
            Ok(())
        })?;
    }
}
