//! Integration tests for the wave CLI.
//!
//! These tests run the binary end-to-end, against a mock Gitea server where a
//! command needs the remote.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command for the wave binary with the Gitea environment cleared.
fn wave() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wave"));
    cmd.env_remove("GITEA_URL")
        .env_remove("GITEA_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Write `wave.yaml` into `dir` with the resource files under `dir/defaults`.
fn write_config(dir: &TempDir, extra: &str) -> PathBuf {
    let path = dir.path().join("wave.yaml");
    let content = format!(
        "config:\n  output_dir: {}\n{extra}",
        dir.path().join("defaults").display()
    );
    fs::write(&path, content).expect("Failed to write config");
    path
}

fn write_resource(dir: &TempDir, file: &str, content: &str) {
    let defaults = dir.path().join("defaults");
    fs::create_dir_all(&defaults).expect("Failed to create output dir");
    fs::write(defaults.join(file), content).expect("Failed to write resource file");
}

fn config_arg(path: &Path) -> [String; 2] {
    ["--config".to_string(), path.display().to_string()]
}

/// Only topics enabled for push.
const TOPICS_ONLY: &str = "push:
  repo_settings: false
  topics: true
  branch_protections: false
  tag_protections: false
  webhooks: false
";

// ============================================================================
// Basic commands
// ============================================================================

#[test]
fn test_help() {
    wave()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("push"))
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_version() {
    wave()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wave"));
}

#[test]
fn test_completions_bash() {
    wave()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wave"));
}

// ============================================================================
// init
// ============================================================================

#[test]
fn test_init_writes_default_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wave.yaml");

    wave()
        .args(config_arg(&path))
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("output_dir: .gitea/defaults"));
    assert!(content.contains("templates: false"));
}

#[test]
fn test_init_keeps_existing_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wave.yaml");
    fs::write(&path, "gitea_url: https://gitea.example.com\n").unwrap();

    wave()
        .args(config_arg(&path))
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "gitea_url: https://gitea.example.com\n"
    );
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_accepts_valid_files() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "webhooks_update_strategy: merge\n");
    write_resource(&temp, "topics.yaml", "topics: [rust, cli]\n");

    wave()
        .args(config_arg(&config))
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_validate_rejects_unknown_strategy() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "topics_update_strategy: overwrite\n");

    wave()
        .args(config_arg(&config))
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid topics update strategy 'overwrite'"));
}

#[test]
fn test_validate_rejects_duplicate_rules() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "");
    write_resource(
        &temp,
        "branch_protections.yaml",
        "rules:\n  - rule_name: main\n  - rule_name: main\n",
    );

    wave()
        .args(config_arg(&config))
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate"))
        .stderr(predicate::str::contains("'main'"));
}

#[test]
fn test_validate_rejects_malformed_yaml() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("wave.yaml");
    fs::write(&config, "pull: [not, a, mapping\n").unwrap();

    wave()
        .args(config_arg(&config))
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}

// ============================================================================
// pull / push without a server
// ============================================================================

#[test]
fn test_pull_without_token_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "gitea_url: https://gitea.example.com\n");

    wave()
        .args(config_arg(&config))
        .args(["pull", "acme/api"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gitea_token is not set"));
}

#[test]
fn test_pull_rejects_bad_repo() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "");

    wave()
        .args(config_arg(&config))
        .args(["pull", "not-a-repo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be owner/repo"));
}

#[test]
fn test_push_without_targets_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "");

    wave()
        .args(config_arg(&config))
        .arg("push")
        .env("GITEA_URL", "http://127.0.0.1:9")
        .env("GITEA_TOKEN", "token")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no target repositories"));
}

// ============================================================================
// Against a mock server
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_push_appends_missing_topic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/topics"))
        .and(header("authorization", "token secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topics": ["rust"] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/repos/acme/api/topics/gitea"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, TOPICS_ONLY);
    write_resource(&temp, "topics.yaml", "topics: [rust, gitea]\n");

    wave()
        .args(config_arg(&config))
        .args(["push", "acme/api"])
        .env("GITEA_URL", server.uri())
        .env("GITEA_TOKEN", "secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Push complete"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_invalid_topic_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topics": ["rust"] })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/repos/acme/api/topics/bad_topic!"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Topic name is invalid" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, TOPICS_ONLY);
    write_resource(&temp, "topics.yaml", "topics: [rust, \"bad_topic!\"]\n");

    wave()
        .args(config_arg(&config))
        .args(["push", "acme/api"])
        .env("GITEA_URL", server.uri())
        .env("GITEA_TOKEN", "secret")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Topic name is invalid"))
        .stderr(predicate::str::contains("1 failure(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_dry_run_makes_no_changes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topics": ["legacy"] })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(
        &temp,
        &format!("{TOPICS_ONLY}topics_update_strategy: replace\n"),
    );
    write_resource(&temp, "topics.yaml", "topics: [rust]\n");

    wave()
        .args(config_arg(&config))
        .args(["--dry-run", "push", "acme/api"])
        .env("GITEA_URL", server.uri())
        .env("GITEA_TOKEN", "secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("[rust]"))
        .stdout(predicate::str::contains("Dry run"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_replace_sets_exact_topics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topics": ["legacy"] })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/repos/acme/api/topics"))
        .and(body_json(json!({ "topics": ["rust"] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(
        &temp,
        &format!("{TOPICS_ONLY}topics_update_strategy: replace\n"),
    );
    write_resource(&temp, "topics.yaml", "topics: [rust]\n");

    wave()
        .args(config_arg(&config))
        .args(["push", "acme/api"])
        .env("GITEA_URL", server.uri())
        .env("GITEA_TOKEN", "secret")
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_push_server_error_fails_with_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/topics"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "database is locked" })),
        )
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, TOPICS_ONLY);
    write_resource(&temp, "topics.yaml", "topics: [rust]\n");

    wave()
        .args(config_arg(&config))
        .args(["push", "acme/api"])
        .env("GITEA_URL", server.uri())
        .env("GITEA_TOKEN", "secret")
        .assert()
        .failure()
        .stderr(predicate::str::contains("database is locked"))
        .stderr(predicate::str::contains("1 failure(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pull_writes_resource_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "api",
            "full_name": "acme/api",
            "default_branch": "main",
            "has_wiki": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topics": ["rust"] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/branch_protections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "rule_name": "main", "branch_name": "main", "required_approvals": 1 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/tag_protections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/hooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 4,
            "type": "gitea",
            "config": { "url": "https://ci.example.com", "content_type": "json" },
            "events": ["push"],
            "active": true
        }])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "");

    wave()
        .args(config_arg(&config))
        .args(["pull", "acme/api"])
        .env("GITEA_URL", server.uri())
        .env("GITEA_TOKEN", "secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 5 file(s)"));

    let defaults = temp.path().join("defaults");
    let settings = fs::read_to_string(defaults.join("repo_settings.yaml")).unwrap();
    assert!(settings.contains("has_wiki: false"));
    let hooks = fs::read_to_string(defaults.join("webhooks.yaml")).unwrap();
    assert!(hooks.contains("https://ci.example.com"));
    assert!(!hooks.contains("id:"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pull_dry_run_keeps_local_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/repos/acme/api/topics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "topics": ["remote"] })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(
        &temp,
        "pull:
  repo_settings: false
  topics: true
  branch_protections: false
  tag_protections: false
  webhooks: false
",
    );
    write_resource(&temp, "topics.yaml", "topics: [local]\n");

    wave()
        .args(config_arg(&config))
        .args(["--dry-run", "pull", "acme/api"])
        .env("GITEA_URL", server.uri())
        .env("GITEA_TOKEN", "secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would write 1 file(s)"))
        .stdout(predicate::str::contains("Dry run"));

    let topics = fs::read_to_string(temp.path().join("defaults/topics.yaml")).unwrap();
    assert_eq!(topics, "topics: [local]\n");
}
