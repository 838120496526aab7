//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::domain::config::ProvcheckConfig;
use crate::domain::{ConnectError, Credential};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default SSH port of a provisioned server.
pub const SSH_PORT: u16 = 22;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Where to open an SSH session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    /// IPv4/IPv6 literal or resolvable host name.
    pub host: String,
    /// TCP port of the SSH daemon.
    pub port: u16,
}

impl SshTarget {
    /// Target the standard SSH port on `host`.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: SSH_PORT,
        }
    }
}

/// Captured result of one remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutput {
    /// Remote exit status. Zero is the only "condition true" signal.
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RemoteOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

// ── Remote Session Ports ──────────────────────────────────────────────────────

/// An authenticated remote command channel to one host.
///
/// Exit status 0 means "condition true"; this is the only contract the
/// services rely on for remote pass/fail.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` to completion and capture its output.
    async fn exec(&self, command: &str) -> Result<RemoteOutput>;

    /// Start `command` without waiting for it to finish.
    ///
    /// The command keeps running at least until the session is closed.
    async fn spawn_detached(&self, command: &str) -> Result<()>;

    /// Close the session. Consumes the handle so it cannot be closed twice.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Opens authenticated sessions. One call is one attempt; retries live in
/// the connection service.
#[allow(async_fn_in_trait)]
pub trait SshConnector {
    type Session: RemoteShell;

    /// Connect and authenticate, applying `timeout` to the TCP connect, the
    /// banner exchange and authentication alike.
    async fn connect(
        &self,
        target: &SshTarget,
        username: &str,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<Self::Session, ConnectError>;
}

/// Loads the private key used for key authentication.
pub trait KeyLoader {
    /// Read and check the PEM key at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::KeyLoad`] if the file is unreadable or not a
    /// PEM private key.
    fn load_private_key(&self, path: &Path) -> Result<Credential, ConnectError>;
}

// ── Network Probe Port ────────────────────────────────────────────────────────

/// Direct TCP reachability checks from the machine running provcheck.
#[allow(async_fn_in_trait)]
pub trait InboundProbe {
    /// Open a fresh TCP connection to `host:port`; `Ok(true)` if it connects.
    async fn check_tcp_port(&self, host: &str, port: u16, timeout: Duration) -> Result<bool>;
}

// ── Time Port ─────────────────────────────────────────────────────────────────

/// Blocking waits between retries, injectable so tests can record them.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults if none is stored.
    fn load(&self) -> Result<ProvcheckConfig>;
    /// Persist the configuration.
    fn save(&self, config: &ProvcheckConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
