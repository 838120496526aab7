//! Application service: full SSH verification of a provisioned server.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::PathBuf;
use std::time::Duration;

use provcheck_common::ConnectionType;

use crate::application::ports::{
    InboundProbe, KeyLoader, ProgressReporter, RemoteShell, SshConnector, SshTarget, Sleeper,
};
use crate::application::services::connection::{self, ConnectRequest};
use crate::application::services::port_probe::{self, INBOUND_PROBE_TIMEOUT, ProbePlan};
use crate::application::services::volume_check;
use crate::domain::config::ProvcheckConfig;
use crate::domain::{ConnectError, Credential, PortProbeResult, RetryPolicy, policy};

/// What the provisioning panel reported about the server under test.
#[derive(Debug, Clone)]
pub struct SshCheckInput {
    pub host: String,
    pub username: String,
    /// May be unset when the server was provisioned with a key.
    pub password: Option<String>,
    /// Panel label of the SSH connection type (`"SSH Key"` or `"Password"`).
    pub connection_type: String,
    pub package: String,
    pub operating_system: String,
    /// Requested extra volume size in GB, as shown by the panel.
    pub extra_volume_gb: String,
}

/// Tunables for one run, usually derived from [`ProvcheckConfig`].
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub zero_tier_marker: String,
    pub ssh_test_interface: String,
    pub private_key_path: PathBuf,
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub inbound_timeout: Duration,
    pub install_retry_count: u32,
    pub install_delay: Duration,
    pub listener_script: String,
    /// Also verify key login when the run authenticates with a password.
    pub verify_key_auth: bool,
}

impl CheckSettings {
    #[must_use]
    pub fn from_config(config: &ProvcheckConfig, listener_script: &str) -> Self {
        Self {
            zero_tier_marker: config.policy.zero_tier_marker.clone(),
            ssh_test_interface: config.policy.ssh_test_interface.clone(),
            private_key_path: PathBuf::from(&config.connect.private_key_path),
            retry: config.connect.retry_policy(),
            timeout: config.connect.timeout(),
            inbound_timeout: INBOUND_PROBE_TIMEOUT,
            install_retry_count: config.install.retry_count,
            install_delay: config.install.delay(),
            listener_script: listener_script.to_string(),
            verify_key_auth: false,
        }
    }
}

/// Violations of one run plus the port observations behind them.
#[derive(Debug, Default)]
pub struct SshCheckOutcome {
    pub violations: Vec<String>,
    /// Empty when no session could be opened.
    pub ports: PortProbeResult,
}

/// Run every SSH-side check and return the violations found.
///
/// An empty list is the only pass signal. Connection problems, probe
/// failures and remote errors all end up as entries in the list; this
/// function never fails. The session opened here is closed before returning.
pub async fn run_ssh_check<C: SshConnector>(
    connector: &C,
    probe: &impl InboundProbe,
    sleeper: &impl Sleeper,
    keys: &impl KeyLoader,
    reporter: &impl ProgressReporter,
    input: &SshCheckInput,
    settings: &CheckSettings,
) -> Vec<String> {
    check_server(connector, probe, sleeper, keys, reporter, input, settings)
        .await
        .violations
}

/// [`run_ssh_check`], keeping the port observations for the report.
pub async fn check_server<C: SshConnector>(
    connector: &C,
    probe: &impl InboundProbe,
    sleeper: &impl Sleeper,
    keys: &impl KeyLoader,
    reporter: &impl ProgressReporter,
    input: &SshCheckInput,
    settings: &CheckSettings,
) -> SshCheckOutcome {
    let subject = format!("{} with {}", input.operating_system, input.package);

    let Some(connection_type) = ConnectionType::from_label(&input.connection_type) else {
        tracing::error!("Unsupported SSH connection type: {}", input.connection_type);
        return SshCheckOutcome {
            violations: vec![format!(
                "{subject} unsupported SSH connection type: {}.",
                input.connection_type
            )],
            ..SshCheckOutcome::default()
        };
    };

    let mut violations = Vec::new();

    if settings.verify_key_auth && connection_type == ConnectionType::Password {
        reporter.step("verifying ssh key login...");
        match open_session(connector, sleeper, keys, input, settings, ConnectionType::SshKey).await
        {
            Ok(session) => close_session(session).await,
            Err(err) => violations.push(connect_violation(&subject, ConnectionType::SshKey, &err)),
        }
    }

    reporter.step(&format!(
        "connecting to {} with {}...",
        input.host,
        connection_type.describe()
    ));
    let session =
        match open_session(connector, sleeper, keys, input, settings, connection_type).await {
            Ok(session) => session,
            Err(err) => {
                reporter.warn(&format!("cannot connect to {}", input.host));
                violations.push(connect_violation(&subject, connection_type, &err));
                return SshCheckOutcome {
                    violations,
                    ..SshCheckOutcome::default()
                };
            }
        };

    reporter.step("probing ports...");
    let plan = ProbePlan {
        host: &input.host,
        package: &input.package,
        operating_system: &input.operating_system,
        ssh_test_interface: &settings.ssh_test_interface,
        listener_script: &settings.listener_script,
        inbound_timeout: settings.inbound_timeout,
        install_retry_count: settings.install_retry_count,
        install_delay: settings.install_delay,
    };
    let outcome = port_probe::probe_ports(&session, probe, sleeper, &plan).await;
    violations.extend(outcome.violations);
    violations.extend(policy::evaluate(&outcome.results, &settings.zero_tier_marker));

    reporter.step("checking extra volume...");
    violations.extend(
        volume_check::verify_extra_volume(
            &session,
            &input.extra_volume_gb,
            &input.operating_system,
            &input.package,
        )
        .await,
    );

    close_session(session).await;

    if violations.is_empty() {
        reporter.success("ssh checks passed");
    } else {
        reporter.warn(&format!("{} violation(s) found", violations.len()));
    }
    SshCheckOutcome {
        violations,
        ports: outcome.results,
    }
}

/// Build the credential for `connection_type` and connect with retries.
async fn open_session<C: SshConnector>(
    connector: &C,
    sleeper: &impl Sleeper,
    keys: &impl KeyLoader,
    input: &SshCheckInput,
    settings: &CheckSettings,
    connection_type: ConnectionType,
) -> Result<C::Session, ConnectError> {
    let credential = match connection_type {
        ConnectionType::SshKey => keys.load_private_key(&settings.private_key_path)?,
        ConnectionType::Password => input
            .password
            .clone()
            .map(Credential::Password)
            .ok_or(ConnectError::MissingPassword)?,
    };
    let request = ConnectRequest {
        target: SshTarget::new(input.host.clone()),
        username: input.username.clone(),
        credential,
        retry: settings.retry,
        timeout: settings.timeout,
    };
    connection::connect(connector, sleeper, &request).await
}

async fn close_session(session: impl RemoteShell) {
    if let Err(e) = session.close().await {
        tracing::warn!("error closing ssh session: {e}");
    }
}

fn connect_violation(subject: &str, connection_type: ConnectionType, err: &ConnectError) -> String {
    tracing::error!("{subject} can't connect with {}: {err}", connection_type.describe());
    format!("{subject} can't connect with {}: {err}", connection_type.describe())
}
