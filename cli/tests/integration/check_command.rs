//! Integration tests for `provcheck check` and `provcheck probe` paths that
//! finish before any SSH traffic.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("provcheck"));
        cmd.env("NO_COLOR", "1")
            .env("PROVCHECK_CONFIG", self.dir.path().join("config.yaml"))
            .env_remove("PROVCHECK_PASSWORD")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn check_args<'a>(host: &'a str, connection_type: &'a str) -> Vec<&'a str> {
    vec![
        "check",
        "--host",
        host,
        "--user",
        "admin",
        "--connection-type",
        connection_type,
        "--package",
        "CloudV 1",
        "--os",
        "Debian 12",
        "--volume-gb",
        "20",
    ]
}

#[test]
fn test_unsupported_connection_type_exits_one() {
    let env = Env::new();
    env.cmd()
        .args(check_args("198.51.100.4", "Kerberos"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Debian 12 with CloudV 1 unsupported SSH connection type: Kerberos.",
        ));
}

#[test]
fn test_unsupported_connection_type_json_report() {
    let env = Env::new();
    let output = env
        .cmd()
        .arg("--json")
        .args(check_args("IPv4: 198.51.100.4 (public)", "Kerberos"))
        .output()
        .expect("run provcheck");
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["host"], "198.51.100.4");
    assert_eq!(report["passed"], false);
    assert_eq!(report["violations"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_unreadable_key_is_reported_without_connecting() {
    let env = Env::new();
    let missing = env.dir.path().join("no_such_key");
    env.cmd()
        .args(check_args("198.51.100.4", "SSH Key"))
        .arg("--key-file")
        .arg(&missing)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("can't connect with ssh key"));
}

#[test]
fn test_password_type_without_password_is_reported() {
    let env = Env::new();
    env.cmd()
        .args(check_args("198.51.100.4", "Password"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("no password supplied"));
}

#[test]
fn test_host_text_without_address_is_an_error() {
    let env = Env::new();
    env.cmd()
        .args(check_args("address pending", "SSH Key"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no IPv4 address found"));
}

#[test]
fn test_log_file_receives_tracing_output() {
    let env = Env::new();
    let log = env.dir.path().join("provcheck.log");
    env.cmd()
        .args(["-v", "--log-file"])
        .arg(&log)
        .args(check_args("198.51.100.4", "Kerberos"))
        .assert()
        .code(1);
    let content = std::fs::read_to_string(&log).expect("log written");
    assert!(content.contains("Unsupported SSH connection type"));
}

#[test]
fn test_probe_reports_every_inbound_port() {
    let env = Env::new();
    let output = env
        .cmd()
        .args([
            "--json",
            "probe",
            "--host",
            "127.0.0.1",
            "--package",
            "CloudV 1",
            "--timeout-secs",
            "1",
        ])
        .output()
        .expect("run provcheck");

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let ports: Vec<u64> = report["ports"]
        .as_array()
        .expect("ports array")
        .iter()
        .filter_map(|p| p["port"].as_u64())
        .collect();
    assert_eq!(ports, vec![22, 443, 80, 1000]);
    assert_eq!(
        output.status.code(),
        Some(if report["passed"] == true { 0 } else { 1 })
    );
}
