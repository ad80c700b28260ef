use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test command isolated from the caller's environment
fn dbtcloudctl() -> Command {
    let mut cmd = Command::cargo_bin("dbtcloudctl").unwrap();
    cmd.env_remove("DBTCLOUDCTL_PROFILE")
        .env_remove("DBTCLOUDCTL_CONFIG_FILE")
        .env_remove("RUST_LOG");
    cmd
}

fn with_config(config: &Path) -> Command {
    let mut cmd = dbtcloudctl();
    cmd.arg("--config-file").arg(config);
    cmd
}

fn add_profile(config: &Path, name: &str, host_url: &str) {
    with_config(config)
        .args([
            "profile",
            "set",
            name,
            "--account-id",
            "1001",
            "--token",
            "dbtc_test_token",
            "--host-url",
            host_url,
        ])
        .assert()
        .success();
}

fn credential_envelope() -> Value {
    json!({
        "data": {
            "id": 3003,
            "account_id": 1001,
            "project_id": 2002,
            "type": "adapter",
            "state": 1,
            "threads": 6,
            "target_name": "default",
            "adapter_id": 77,
            "credential_details": {
                "fields": {
                    "token": {
                        "metadata": {
                            "label": "Token",
                            "description": "Personalized user token.",
                            "field_type": "text",
                            "encrypt": true
                        },
                        "value": "dapi-plaintext"
                    },
                    "schema": {
                        "metadata": {
                            "label": "Schema",
                            "description": "User schema.",
                            "field_type": "text",
                            "encrypt": false
                        },
                        "value": "analytics"
                    }
                },
                "field_order": ["schema", "token"]
            }
        },
        "status": {"code": 200, "is_success": true}
    })
}

const RESOURCE_PATH: &str = "/v3/accounts/1001/projects/2002/credentials/3003/";

// ============================================================================
// Basic flags
// ============================================================================

#[test]
fn test_help_flag() {
    dbtcloudctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbt Cloud"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_version_flag() {
    dbtcloudctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dbtcloudctl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_args_shows_help() {
    dbtcloudctl()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    dbtcloudctl()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_credential_help_lists_operations() {
    dbtcloudctl()
        .args(["databricks-credential", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("delete"));
}

// ============================================================================
// Profiles
// ============================================================================

#[test]
fn test_profile_lifecycle() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    with_config(&config)
        .args([
            "profile",
            "set",
            "prod",
            "--account-id",
            "12345",
            "--token",
            "dbtc_abcdef1234",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'prod' created successfully"));
    add_profile(&config, "dev", "https://emea.dbt.com/api");

    let output = with_config(&config)
        .args(["profile", "list", "-o", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listed: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(listed["count"], json!(2));
    assert_eq!(listed["profiles"][0]["name"], json!("dev"));
    assert_eq!(listed["profiles"][1]["name"], json!("prod"));
    assert_eq!(listed["profiles"][1]["is_default"], json!(true));

    with_config(&config)
        .args(["profile", "show", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12345"))
        .stdout(predicate::str::contains("1234"))
        .stdout(predicate::str::contains("dbtc_abcdef").not());

    with_config(&config)
        .args(["profile", "default", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Default profile set to 'dev'"));

    with_config(&config)
        .args(["profile", "remove", "dev", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed successfully"));

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("[profiles.prod]"));
    assert!(!saved.contains("[profiles.dev]"));
    assert!(!saved.contains("default_profile"));
}

#[test]
fn test_profile_show_missing_profile_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    with_config(&config)
        .args(["profile", "show", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Profile 'nope' not found"))
        .stderr(predicate::str::contains("tip"));
}

#[test]
fn test_profile_path_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    with_config(&config)
        .args(["profile", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ============================================================================
// Databricks credentials
// ============================================================================

#[test]
fn test_credential_get_without_profile_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    with_config(&config)
        .args([
            "databricks-credential",
            "get",
            "--project-id",
            "2002",
            "--credential-id",
            "3003",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No profile configured"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_credential_get_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE_PATH))
        .and(query_param("include_related", "[adapter]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    add_profile(&config, "test", &server.uri());

    let output = with_config(&config)
        .args([
            "dbx",
            "get",
            "--project-id",
            "2002",
            "--credential-id",
            "3003",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let credential: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(credential["id"], json!(3003));
    assert_eq!(credential["state"], json!(1));
    assert_eq!(credential["type"], json!("adapter"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_credential_get_table_masks_encrypted_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential_envelope()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    add_profile(&config, "test", &server.uri());

    with_config(&config)
        .args([
            "dbx",
            "get",
            "--project-id",
            "2002",
            "--credential-id",
            "3003",
            "-o",
            "table",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("analytics"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("dapi-plaintext").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_credential_get_with_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential_envelope()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    add_profile(&config, "test", &server.uri());

    with_config(&config)
        .args([
            "dbx",
            "get",
            "--project-id",
            "2002",
            "--credential-id",
            "3003",
            "-q",
            "target_name",
        ])
        .assert()
        .success()
        .stdout(predicate::str::diff("\"default\"\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_credential_get_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("resource-not-found"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    add_profile(&config, "test", &server.uri());

    with_config(&config)
        .args([
            "dbx",
            "get",
            "--project-id",
            "2002",
            "--credential-id",
            "3003",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not found"))
        .stderr(predicate::str::contains("resource-not-found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_credential_update_from_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RESOURCE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(credential_envelope()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    add_profile(&config, "test", &server.uri());

    let data_file = dir.path().join("credential.json");
    std::fs::write(
        &data_file,
        serde_json::to_string(&credential_envelope()["data"]).unwrap(),
    )
    .unwrap();

    with_config(&config)
        .args([
            "dbx",
            "update",
            "--project-id",
            "2002",
            "--credential-id",
            "3003",
        ])
        .arg("--data")
        .arg(format!("@{}", data_file.display()))
        .assert()
        .success();

    let requests = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["target_name"], json!("default"));
    assert_eq!(sent["credential_details"]["field_order"], json!(["schema", "token"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_credential_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(RESOURCE_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    add_profile(&config, "test", &server.uri());

    with_config(&config)
        .args([
            "dbx",
            "delete",
            "--project-id",
            "2002",
            "--credential-id",
            "3003",
            "-o",
            "table",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Credential 3003 deleted from project 2002.",
        ));
}
