//! Domain types and validators for provcheck configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::backoff::RetryPolicy;
use crate::domain::error::ConfigError;
use crate::domain::policy::DEFAULT_ZERO_TIER_MARKER;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "connect.max_attempts",
    "connect.initial_delay_secs",
    "connect.backoff_factor",
    "connect.timeout_secs",
    "connect.private_key_path",
    "install.retry_count",
    "install.delay_secs",
    "policy.zero_tier_marker",
    "policy.ssh_test_interface",
];

/// OS label of the image the outbound checks are written for.
pub const DEFAULT_SSH_TEST_INTERFACE: &str = "Debian 12";

/// Private key location relative to the working directory.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "ssh_tests/private_key.txt";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.provcheck/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ProvcheckConfig {
    /// SSH connection settings.
    pub connect: ConnectConfig,
    /// Remote package installation settings.
    pub install: InstallConfig,
    /// Port policy settings.
    pub policy: PolicyConfig,
}

/// SSH connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectConfig {
    /// Total connection attempts.
    pub max_attempts: u32,
    /// Delay before the second attempt, in seconds.
    pub initial_delay_secs: f64,
    /// Multiplier applied to the delay after each failure.
    pub backoff_factor: f64,
    /// Connect, banner and auth timeout, in seconds.
    pub timeout_secs: u64,
    /// PEM private key used for key authentication.
    pub private_key_path: String,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_secs: 3.0,
            backoff_factor: 2.0,
            timeout_secs: 200,
            private_key_path: DEFAULT_PRIVATE_KEY_PATH.to_string(),
        }
    }
}

impl ConnectConfig {
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::try_from_secs_f64(self.initial_delay_secs)
                .unwrap_or(Duration::ZERO),
            backoff_factor: self.backoff_factor,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Remote package installation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstallConfig {
    /// Install attempts before giving up.
    pub retry_count: u32,
    /// Fixed delay slept before each attempt, in seconds.
    pub delay_secs: u64,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            retry_count: 30,
            delay_secs: 3,
        }
    }
}

impl InstallConfig {
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Port policy settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Package label substring identifying the zero tier.
    pub zero_tier_marker: String,
    /// OS label on which outbound checks run.
    pub ssh_test_interface: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            zero_tier_marker: DEFAULT_ZERO_TIER_MARKER.to_string(),
            ssh_test_interface: DEFAULT_SSH_TEST_INTERFACE.to_string(),
        }
    }
}

impl ProvcheckConfig {
    /// Apply the `config set` rules to every field.
    ///
    /// # Errors
    ///
    /// Returns the first field whose value `config set` would reject.
    pub fn validate(&self) -> Result<()> {
        let connect = &self.connect;
        at_least("connect.max_attempts", connect.max_attempts, 1)?;
        float_at_least(
            "connect.initial_delay_secs",
            connect.initial_delay_secs,
            0.0,
        )?;
        float_at_least("connect.backoff_factor", connect.backoff_factor, 1.0)?;
        if connect.timeout_secs < 1 {
            return Err(invalid(
                "connect.timeout_secs",
                &connect.timeout_secs.to_string(),
                "Expected an integer ≥ 1",
            ));
        }
        non_empty("connect.private_key_path", &connect.private_key_path)?;
        at_least("install.retry_count", self.install.retry_count, 1)?;
        non_empty("policy.zero_tier_marker", &self.policy.zero_tier_marker)?;
        non_empty("policy.ssh_test_interface", &self.policy.ssh_test_interface)?;
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validate `value` for `key` and store it in `config`.
///
/// # Errors
///
/// Returns an error if the key is unknown or the value does not parse.
pub fn set_config_value(config: &mut ProvcheckConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    match key {
        "connect.max_attempts" => {
            config.connect.max_attempts = parse_at_least(key, value, 1)?;
        }
        "connect.initial_delay_secs" => {
            config.connect.initial_delay_secs = parse_float_at_least(key, value, 0.0)?;
        }
        "connect.backoff_factor" => {
            config.connect.backoff_factor = parse_float_at_least(key, value, 1.0)?;
        }
        "connect.timeout_secs" => {
            config.connect.timeout_secs = u64::from(parse_at_least(key, value, 1)?);
        }
        "connect.private_key_path" => {
            config.connect.private_key_path = non_empty(key, value)?;
        }
        "install.retry_count" => {
            config.install.retry_count = parse_at_least(key, value, 1)?;
        }
        "install.delay_secs" => {
            config.install.delay_secs = u64::from(parse_at_least(key, value, 0)?);
        }
        "policy.zero_tier_marker" => {
            config.policy.zero_tier_marker = non_empty(key, value)?;
        }
        "policy.ssh_test_interface" => {
            config.policy.ssh_test_interface = non_empty(key, value)?;
        }
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    Ok(())
}

fn invalid(key: &str, value: &str, expected: impl Into<String>) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.into(),
    }
    .into()
}

fn parse_at_least(key: &str, value: &str, min: u32) -> Result<u32> {
    let n = value
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid(key, value, format!("Expected an integer ≥ {min}")))?;
    at_least(key, n, min)
}

fn at_least(key: &str, n: u32, min: u32) -> Result<u32> {
    if n < min {
        return Err(invalid(key, &n.to_string(), format!("Expected an integer ≥ {min}")));
    }
    Ok(n)
}

fn parse_float_at_least(key: &str, value: &str, min: f64) -> Result<f64> {
    let n = value
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(key, value, format!("Expected a number ≥ {min}")))?;
    float_at_least(key, n, min)
}

fn float_at_least(key: &str, n: f64, min: f64) -> Result<f64> {
    if !(n.is_finite() && n >= min) {
        return Err(invalid(key, &n.to_string(), format!("Expected a number ≥ {min}")));
    }
    Ok(n)
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(key, value, "Expected a non-empty value"));
    }
    Ok(trimmed.to_string())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
