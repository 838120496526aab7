use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the admin user authenticates against the provisioned server.
///
/// The labels match the options offered by the provisioning panel's
/// "SSH connection type" selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    SshKey,
    Password,
}

impl ConnectionType {
    /// Panel label for key-based authentication.
    pub const SSH_KEY_LABEL: &'static str = "SSH Key";
    /// Panel label for password authentication.
    pub const PASSWORD_LABEL: &'static str = "Password";

    /// Parse a panel label. Matching is exact; anything else is unsupported.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            Self::SSH_KEY_LABEL => Some(Self::SshKey),
            Self::PASSWORD_LABEL => Some(Self::Password),
            _ => None,
        }
    }

    /// The panel label for this connection type.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SshKey => Self::SSH_KEY_LABEL,
            Self::Password => Self::PASSWORD_LABEL,
        }
    }

    /// Lower-case wording used inside violation messages.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::SshKey => "ssh key",
            Self::Password => "password",
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Traffic direction a port rule applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// An external client connecting to the server.
    Inbound,
    /// The server connecting out to a third party.
    Outbound,
}

/// One probed port as reported to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortObservation {
    pub port: u16,
    /// `None` for ports outside the policy table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<PortDirection>,
    pub is_open: bool,
    pub package: String,
}

/// Result of one provisioned-server check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub host: String,
    pub package: String,
    pub operating_system: String,
    /// `true` only when `violations` is empty.
    pub passed: bool,
    pub violations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortObservation>,
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    /// Build a report stamped with the current time.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        package: impl Into<String>,
        operating_system: impl Into<String>,
        violations: Vec<String>,
    ) -> Self {
        Self {
            host: host.into(),
            package: package.into(),
            operating_system: operating_system.into(),
            passed: violations.is_empty(),
            violations,
            ports: Vec::new(),
            checked_at: Utc::now(),
        }
    }

    /// Attach the per-port observations.
    #[must_use]
    pub fn with_ports(mut self, ports: Vec<PortObservation>) -> Self {
        self.ports = ports;
        self
    }
}
