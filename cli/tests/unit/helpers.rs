//! Shared test helpers: remote output constructors and canned inputs.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use provcheck_cli::application::ports::RemoteOutput;
use provcheck_cli::application::services::ssh_check::{CheckSettings, SshCheckInput};
use provcheck_cli::domain::RetryPolicy;

pub const HOST: &str = "198.51.100.20";
pub const LISTENER: &str = "print('listening')";
pub const INSTALL: &str = "sudo apt-get install -y netcat-traditional";
pub const LSBLK: &str = "lsblk -o NAME,SIZE";
pub const LISTING_WITH_20G: &str = "NAME    SIZE\nvda      25G\n└─vda1 24.9G\nvdb      20G\n";

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok(stdout: &str) -> RemoteOutput {
    RemoteOutput {
        exit_status: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn fail(code: i32, stderr: &str) -> RemoteOutput {
    RemoteOutput {
        exit_status: code,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

// ── Canned inputs ────────────────────────────────────────────────────────────

pub fn retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_secs(3),
        backoff_factor: 2.0,
    }
}

pub fn settings() -> CheckSettings {
    CheckSettings {
        zero_tier_marker: "CloudV 0".to_string(),
        ssh_test_interface: "Debian 12".to_string(),
        private_key_path: PathBuf::from("keys/id_test"),
        retry: retry(5),
        timeout: Duration::from_secs(200),
        inbound_timeout: Duration::from_secs(5),
        install_retry_count: 3,
        install_delay: Duration::from_secs(3),
        listener_script: LISTENER.to_string(),
        verify_key_auth: false,
    }
}

pub fn input(connection_type: &str) -> SshCheckInput {
    SshCheckInput {
        host: HOST.to_string(),
        username: "admin".to_string(),
        password: Some("s3cret".to_string()),
        connection_type: connection_type.to_string(),
        package: "CloudV 1".to_string(),
        operating_system: "Debian 12".to_string(),
        extra_volume_gb: "20".to_string(),
    }
}

pub fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|s| Duration::from_secs(*s)).collect()
}
