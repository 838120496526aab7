//! `provcheck probe`: inbound port probe and policy evaluation, no SSH.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use provcheck_common::CheckReport;

use crate::app::AppContext;
use crate::application::ports::ProgressReporter;
use crate::application::services::config_service;
use crate::application::services::port_probe::probe_inbound_ports;
use crate::commands::{finish_report, parse_label, resolve_host};
use crate::domain::policy;
use crate::infra::network::TcpInboundProbe;

/// Arguments for the probe command.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Server address, or any text containing it
    #[arg(long)]
    pub host: String,

    /// Package label the policy is evaluated for
    #[arg(long, default_value = "")]
    pub package: String,

    /// Operating system label shown in the report
    #[arg(long = "os", default_value = "unknown")]
    pub operating_system: String,

    /// Package label substring marking the zero tier
    #[arg(long, value_parser = parse_label)]
    pub zero_tier: Option<String>,

    /// Use the IPv6 address found in --host
    #[arg(long)]
    pub ipv6: bool,

    /// Connect timeout per port, in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

/// Run the probe command.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or `--host` holds no address.
pub async fn run(app: &AppContext, args: ProbeArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let marker = args
        .zero_tier
        .unwrap_or(config.policy.zero_tier_marker);
    let host = resolve_host(&args.host, args.ipv6)?;

    let reporter = app.reporter();
    reporter.step(&format!("probing inbound ports on {host}..."));
    let results = probe_inbound_ports(
        &TcpInboundProbe,
        &host,
        &args.package,
        Duration::from_secs(args.timeout_secs),
    )
    .await;
    let violations = policy::evaluate(&results, &marker);

    let report = CheckReport::new(host, args.package, args.operating_system, violations)
        .with_ports(results.to_observations());
    finish_report(app, &report)
}
