//! Integration tests for `provcheck config`.
//!
//! Every test points `PROVCHECK_CONFIG` at a temp path so it never reads or
//! writes `~/.provcheck/config.yaml`.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn provcheck(config: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("provcheck"));
    cmd.env("NO_COLOR", "1").env("PROVCHECK_CONFIG", config);
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

#[test]
fn test_config_show_without_file_prints_defaults() {
    let (_dir, path) = temp_config_path();
    provcheck(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("connect.max_attempts"))
        .stdout(predicate::str::contains("CloudV 0"))
        .stdout(predicate::str::contains("Debian 12"))
        .stdout(predicate::str::contains("PROVCHECK_CONFIG"));
}

#[test]
fn test_config_show_does_not_create_file() {
    let (_dir, path) = temp_config_path();
    provcheck(&path).args(["config", "show"]).assert().success();
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_persists_value() {
    let (_dir, path) = temp_config_path();
    provcheck(&path)
        .args(["config", "set", "install.retry_count", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set install.retry_count = 12"));

    let content = std::fs::read_to_string(&path).expect("config written");
    assert!(content.contains("retry_count: 12"));

    let output = provcheck(&path)
        .args(["--json", "config", "show"])
        .output()
        .expect("run provcheck");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["install"]["retry_count"], 12);
}

#[test]
fn test_config_set_unknown_key_fails() {
    let (_dir, path) = temp_config_path();
    provcheck(&path)
        .args(["config", "set", "connect.port", "2222"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting: connect.port"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_invalid_value_fails() {
    let (_dir, path) = temp_config_path();
    provcheck(&path)
        .args(["config", "set", "connect.backoff_factor", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("connect.backoff_factor"));
}

#[test]
fn test_config_error_in_json_mode_is_json_object() {
    let (_dir, path) = temp_config_path();
    let output = provcheck(&path)
        .args(["--json", "config", "set", "bogus.key", "1"])
        .output()
        .expect("run provcheck");
    assert!(!output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["error"], true);
}

#[test]
fn test_hand_edited_invalid_config_is_refused() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "connect:\n  backoff_factor: -2.0\n").expect("write config");
    provcheck(&path)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("connect.backoff_factor"));
}
