//! `provcheck check`: full SSH verification of a provisioned server.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use provcheck_common::CheckReport;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::application::services::ssh_check::{CheckSettings, SshCheckInput, check_server};
use crate::commands::{finish_report, parse_label, resolve_host};
use crate::infra::assets::LISTENER_SCRIPT;
use crate::infra::clock::TokioSleeper;
use crate::infra::keys::FileKeyLoader;
use crate::infra::network::TcpInboundProbe;
use crate::infra::ssh::Ssh2Connector;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Server address, or any text containing it
    #[arg(long)]
    pub host: String,

    /// Admin user name
    #[arg(long)]
    pub user: String,

    /// Admin password (required for "Password" connection type)
    #[arg(long, env = "PROVCHECK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// SSH connection type as shown by the panel: "SSH Key" or "Password"
    #[arg(long)]
    pub connection_type: String,

    /// Package label, e.g. "CloudV 1"
    #[arg(long)]
    pub package: String,

    /// Operating system label, e.g. "Debian 12"
    #[arg(long = "os")]
    pub operating_system: String,

    /// Requested extra volume size in GB
    #[arg(long)]
    pub volume_gb: u32,

    /// OS label on which outbound checks run
    #[arg(long, value_parser = parse_label)]
    pub ssh_test_interface: Option<String>,

    /// Package label substring marking the zero tier
    #[arg(long, value_parser = parse_label)]
    pub zero_tier: Option<String>,

    /// Private key used for key authentication
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    /// Use the IPv6 address found in --host
    #[arg(long)]
    pub ipv6: bool,

    /// Also verify key login when connecting with a password
    #[arg(long)]
    pub verify_key_auth: bool,
}

impl CheckArgs {
    /// Fold command-line overrides into settings loaded from config.
    pub fn apply_overrides(&self, settings: &mut CheckSettings) {
        if let Some(interface) = &self.ssh_test_interface {
            settings.ssh_test_interface.clone_from(interface);
        }
        if let Some(marker) = &self.zero_tier {
            settings.zero_tier_marker.clone_from(marker);
        }
        if let Some(path) = &self.key_file {
            settings.private_key_path.clone_from(path);
        }
        settings.verify_key_auth = self.verify_key_auth;
    }
}

/// Run the check command.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or `--host` holds no address.
/// Check failures are reported, not returned.
pub async fn run(app: &AppContext, args: CheckArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let mut settings = CheckSettings::from_config(&config, LISTENER_SCRIPT);
    args.apply_overrides(&mut settings);

    let host = resolve_host(&args.host, args.ipv6)?;
    tracing::info!("checking {host} ({} on {})", args.package, args.operating_system);

    let input = SshCheckInput {
        host: host.clone(),
        username: args.user,
        password: args.password,
        connection_type: args.connection_type,
        package: args.package,
        operating_system: args.operating_system,
        extra_volume_gb: args.volume_gb.to_string(),
    };
    let outcome = check_server(
        &Ssh2Connector,
        &TcpInboundProbe,
        &TokioSleeper,
        &FileKeyLoader,
        &app.reporter(),
        &input,
        &settings,
    )
    .await;

    let report = CheckReport::new(
        host,
        input.package,
        input.operating_system,
        outcome.violations,
    )
    .with_ports(outcome.ports.to_observations());
    finish_report(app, &report)
}
