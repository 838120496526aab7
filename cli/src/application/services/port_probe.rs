//! Application service: inbound and outbound port probing.
//!
//! Inbound ports are probed with direct TCP connects from this machine.
//! Outbound ports are probed from inside the server with `nc`, which is
//! installed on demand.

use std::time::Duration;

use crate::application::ports::{InboundProbe, RemoteShell, Sleeper};
use crate::domain::PortProbeResult;
use crate::domain::policy::{INBOUND_PORTS, OUTBOUND_PORTS};

/// Installs the TCP utility used for outbound probes.
pub const NETCAT_INSTALL_COMMAND: &str = "sudo apt-get install -y netcat-traditional";

/// Outbound probe; the port under test is appended.
pub const OUTBOUND_PROBE_COMMAND: &str = "nc -z smtp.mail.yahoo.com";

/// Remote interpreter invocation that receives the listener script.
pub const LISTENER_INTERPRETER: &str = "sudo python3 -c";

/// Connect timeout for a single inbound probe.
pub const INBOUND_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Inputs for one probe run.
pub struct ProbePlan<'a> {
    /// Address probed from this machine.
    pub host: &'a str,
    /// Package label recorded with every observation.
    pub package: &'a str,
    /// OS the server was provisioned with.
    pub operating_system: &'a str,
    /// OS on which the outbound checks are known to work.
    pub ssh_test_interface: &'a str,
    /// Script started on the server so inbound ports have listeners.
    pub listener_script: &'a str,
    pub inbound_timeout: Duration,
    pub install_retry_count: u32,
    pub install_delay: Duration,
}

/// Observations plus the violations raised while collecting them.
#[derive(Debug, Default)]
pub struct PortProbeOutcome {
    pub results: PortProbeResult,
    pub violations: Vec<String>,
}

/// Whether outbound checks apply: trimmed, case-insensitive label equality.
#[must_use]
pub fn os_matches_test_interface(ssh_test_interface: &str, operating_system: &str) -> bool {
    ssh_test_interface
        .trim()
        .eq_ignore_ascii_case(operating_system.trim())
}

/// Remote command that starts the listener script.
#[must_use]
pub fn listener_bootstrap_command(script: &str) -> String {
    format!("{LISTENER_INTERPRETER} \"{script}\"")
}

/// Probe one inbound port. Any connect error counts as closed.
pub async fn probe_inbound_port(
    probe: &impl InboundProbe,
    host: &str,
    port: u16,
    timeout: Duration,
) -> bool {
    match probe.check_tcp_port(host, port, timeout).await {
        Ok(true) => {
            tracing::info!("Test pass: Connected to {host} on port {port}");
            true
        }
        Ok(false) => {
            tracing::error!("Test failed: Unable to connect to {host} on port {port}");
            false
        }
        Err(e) => {
            tracing::error!("Test failed: Unable to connect to {host} on port {port}: {e}");
            false
        }
    }
}

/// Probe every inbound policy port, in table order.
pub async fn probe_inbound_ports(
    probe: &impl InboundProbe,
    host: &str,
    package: &str,
    timeout: Duration,
) -> PortProbeResult {
    let mut results = PortProbeResult::new();
    for port in INBOUND_PORTS {
        let open = probe_inbound_port(probe, host, port, timeout).await;
        results.record(port, open, package);
    }
    results
}

/// Probe one outbound port from inside the server.
///
/// Exit status 0 means open. Errors count as closed: an unverifiable port is
/// not reported as open.
pub async fn probe_outbound_port(shell: &impl RemoteShell, port: u16) -> bool {
    let command = format!("{OUTBOUND_PROBE_COMMAND} {port}");
    match shell.exec(&command).await {
        Ok(output) if output.success() => {
            tracing::info!("Port {port} is open on smtp.mail.yahoo.com");
            true
        }
        Ok(_) => {
            tracing::info!("Port {port} is closed on smtp.mail.yahoo.com");
            false
        }
        Err(e) => {
            tracing::warn!("Error checking port {port}: {e}");
            false
        }
    }
}

/// Install a remote package, retrying with a fixed delay.
///
/// The delay is slept before every attempt, including the first, so a
/// freshly booted server can release the package manager lock. Returns `true`
/// on the first zero exit status within `retry_count` attempts.
pub async fn install_remote_package(
    shell: &impl RemoteShell,
    sleeper: &impl Sleeper,
    command: &str,
    delay: Duration,
    retry_count: u32,
) -> bool {
    for attempt in 1..=retry_count {
        sleeper.sleep(delay).await;
        match shell.exec(command).await {
            Ok(output) if output.success() => {
                tracing::info!("{command} : installation successful");
                return true;
            }
            Ok(output) => {
                tracing::error!(
                    attempt,
                    "Error installing {command}: {}",
                    output.stderr.trim()
                );
            }
            Err(e) => tracing::error!(attempt, "Error installing {command}: {e}"),
        }
    }
    tracing::error!("{command} : installation failed after {retry_count} attempts");
    false
}

/// Start the listener script in the background. Failures are logged only:
/// a missing listener shows up as closed inbound ports.
pub async fn start_listener_bootstrap(shell: &impl RemoteShell, script: &str) {
    let command = listener_bootstrap_command(script);
    if let Err(e) = shell.spawn_detached(&command).await {
        tracing::warn!("could not start inbound listeners: {e}");
    }
}

/// Run the full probe sequence against an open session.
///
/// Inbound ports are always probed. Outbound ports are probed only when the
/// server OS matches the test interface and netcat installs; otherwise the
/// result holds no outbound entries.
pub async fn probe_ports(
    shell: &impl RemoteShell,
    probe: &impl InboundProbe,
    sleeper: &impl Sleeper,
    plan: &ProbePlan<'_>,
) -> PortProbeOutcome {
    let mut outcome = PortProbeOutcome::default();

    start_listener_bootstrap(shell, plan.listener_script).await;
    outcome.results =
        probe_inbound_ports(probe, plan.host, plan.package, plan.inbound_timeout).await;

    if !os_matches_test_interface(plan.ssh_test_interface, plan.operating_system) {
        tracing::info!(
            "skipping outbound checks: {} is not the test interface {}",
            plan.operating_system,
            plan.ssh_test_interface
        );
        return outcome;
    }

    let installed = install_remote_package(
        shell,
        sleeper,
        NETCAT_INSTALL_COMMAND,
        plan.install_delay,
        plan.install_retry_count,
    )
    .await;
    if !installed {
        outcome.violations.push(format!(
            "{} with {} can't install netcat with: {NETCAT_INSTALL_COMMAND}.",
            plan.package, plan.operating_system
        ));
        return outcome;
    }

    for port in OUTBOUND_PORTS {
        let open = probe_outbound_port(shell, port).await;
        outcome.results.record(port, open, plan.package);
    }
    outcome
}
