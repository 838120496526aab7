//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Connection errors ─────────────────────────────────────────────────────────

/// Why an SSH connection attempt failed.
///
/// The variant decides the retry policy: only `Protocol` and `Transport`
/// failures are worth another attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("cannot load private key {path}: {reason}")]
    KeyLoad { path: String, reason: String },

    #[error("no password supplied for password authentication")]
    MissingPassword,

    #[error("ssh protocol error: {0}")]
    Protocol(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ConnectError {
    /// Returns `true` when a later attempt could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::Transport(_))
    }
}

// ── Address errors ────────────────────────────────────────────────────────────

/// Errors extracting a server address from panel text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("no {family} address found in {text:?}")]
    NotFound { family: &'static str, text: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}
