//! CLI integration tests.
//!
//! These run the compiled `blobvault` binary with a scrubbed environment.
//! Secret commands talk to a wiremock server standing in for the Azure
//! blob endpoint; the memory backend is only accepted by `serve`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_bytes, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A `blobvault` command with an isolated HOME and no inherited settings.
fn blobvault(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("blobvault").unwrap();
    cmd.env_clear().env("HOME", home.path());
    cmd
}

fn azure(home: &TempDir, server: &MockServer) -> Command {
    let mut cmd = blobvault(home);
    cmd.env("BLOBVAULT_BLOB_ENDPOINT", server.uri())
        .env("AZURE_SAS_TOKEN", "sv=2022-11-02&sig=test");
    cmd
}

/// Mock blob endpoint whose `vault` container already exists.
async fn blob_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/vault"))
        .and(query_param("restype", "container"))
        .respond_with(
            ResponseTemplate::new(409).insert_header("x-ms-error-code", "ContainerAlreadyExists"),
        )
        .mount(&server)
        .await;
    server
}

fn listing(names: &[&str]) -> ResponseTemplate {
    let blobs: String = names
        .iter()
        .map(|n| format!("<Blob><Name>{}</Name></Blob>", n))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <EnumerationResults><Blobs>{}</Blobs><NextMarker/></EnumerationResults>",
            blobs
        ),
        "application/xml",
    )
}

fn blob_not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).insert_header("x-ms-error-code", "BlobNotFound")
}

// =============================================================================
// Basics
// =============================================================================

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    blobvault(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("blobvault"));
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    blobvault(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("put"));
}

#[test]
fn completion_bash() {
    let home = TempDir::new().unwrap();
    blobvault(&home)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blobvault"));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn azure_without_credentials_fails() {
    let home = TempDir::new().unwrap();
    blobvault(&home)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AZURE_STORAGE_ACCOUNT"));
}

#[test]
fn azure_without_sas_token_fails() {
    let home = TempDir::new().unwrap();
    blobvault(&home)
        .env("AZURE_STORAGE_ACCOUNT", "myaccount")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AZURE_SAS_TOKEN"));
}

#[test]
fn unknown_backend_fails() {
    let home = TempDir::new().unwrap();
    blobvault(&home)
        .env("BLOBVAULT_BACKEND", "s3")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("s3"));
}

#[test]
fn invalid_container_name_fails() {
    let home = TempDir::new().unwrap();
    blobvault(&home)
        .env("BLOBVAULT_BACKEND", "memory")
        .env("BLOBVAULT_CONTAINER", "Not_Valid")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not_Valid"));
}

#[test]
fn one_shot_commands_refuse_memory_backend() {
    let home = TempDir::new().unwrap();
    for args in [
        vec!["list"],
        vec!["get", "db-password"],
        vec!["put", "db-password", "s3cr3t"],
        vec!["delete", "db-password"],
    ] {
        blobvault(&home)
            .env("BLOBVAULT_BACKEND", "memory")
            .args(&args)
            .assert()
            .failure()
            .stdout(predicate::str::contains("stored").not())
            .stderr(predicate::str::contains("serve --backend memory"));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn config_file_supplies_azure_settings() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/team-secrets"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/team-secrets"))
        .and(query_param("comp", "list"))
        .respond_with(listing(&[]))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = home.path().join("blobvault.toml");
    std::fs::write(
        &config,
        format!(
            "container = \"team-secrets\"\n\n[azure]\nendpoint = \"{}\"\nsas_token = \"sig=test\"\n",
            server.uri()
        ),
    )
    .unwrap();

    blobvault(&home)
        .env("BLOBVAULT_CONFIG", &config)
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"secrets\": []"));
}

// =============================================================================
// Secret commands
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn list_empty() {
    let server = blob_endpoint().await;
    Mock::given(method("GET"))
        .and(path("/vault"))
        .and(query_param("comp", "list"))
        .respond_with(listing(&[]))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No secrets."));
    azure(&home, &server)
        .args(["list", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn list_prints_sorted_names() {
    let server = blob_endpoint().await;
    Mock::given(method("GET"))
        .and(path("/vault"))
        .and(query_param("comp", "list"))
        .respond_with(listing(&["db-password", "api-key"]))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .arg("list")
        .assert()
        .success()
        .stdout("api-key\ndb-password\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn get_prints_value_from_blob() {
    let server = blob_endpoint().await;
    Mock::given(method("GET"))
        .and(path("/vault/db-password"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"s3cr3t".to_vec()))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["get", "db-password"])
        .assert()
        .success()
        .stdout("s3cr3t\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn get_missing_fails() {
    let server = blob_endpoint().await;
    Mock::given(method("GET"))
        .and(path("/vault/db-password"))
        .respond_with(blob_not_found())
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["get", "db-password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret not found: db-password"));
}

#[tokio::test(flavor = "multi_thread")]
async fn get_reports_store_failure() {
    let server = blob_endpoint().await;
    Mock::given(method("GET"))
        .and(path("/vault/db-password"))
        .respond_with(
            ResponseTemplate::new(403).insert_header("x-ms-error-code", "AuthenticationFailed"),
        )
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["get", "db-password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AuthenticationFailed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn put_with_value() {
    let server = blob_endpoint().await;
    Mock::given(method("PUT"))
        .and(path("/vault/db-password"))
        .and(body_bytes(b"s3cr3t".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["put", "db-password", "s3cr3t"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secret 'db-password' stored"));
}

#[tokio::test(flavor = "multi_thread")]
async fn put_reads_value_from_stdin() {
    let server = blob_endpoint().await;
    Mock::given(method("PUT"))
        .and(path("/vault/db-password"))
        .and(body_bytes(b"s3cr3t".to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["put", "db-password", "--json"])
        .write_stdin("s3cr3t\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\"message\": \"secret 'db-password' stored\"",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn put_empty_stdin_fails_validation() {
    let server = blob_endpoint().await;
    Mock::given(method("PUT"))
        .and(path("/vault/db-password"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["put", "db-password"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret value is required"));
}

#[tokio::test(flavor = "multi_thread")]
async fn put_dot_segment_name_fails_validation() {
    let server = blob_endpoint().await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["put", "..", "s3cr3t"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret name '..' is not allowed"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() == "/vault"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_missing_fails() {
    let server = blob_endpoint().await;
    Mock::given(method("DELETE"))
        .and(path("/vault/db-password"))
        .respond_with(blob_not_found())
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["delete", "db-password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to delete secret 'db-password'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_existing() {
    let server = blob_endpoint().await;
    Mock::given(method("DELETE"))
        .and(path("/vault/db-password"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    azure(&home, &server)
        .args(["delete", "db-password"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secret 'db-password' deleted"));
}
