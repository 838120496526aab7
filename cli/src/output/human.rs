//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;
use provcheck_common::{CheckReport, PortDirection, PortObservation};

use crate::domain::config::ProvcheckConfig;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        self.ctx.info(&format!("provcheck v{version}"));
    }

    /// Render a check report. Violations are printed even when `quiet`.
    pub fn render_check_report(&self, report: &CheckReport) {
        if !self.ctx.quiet {
            println!();
            self.ctx.header(&format!(
                "{} ({} on {})",
                report.host, report.package, report.operating_system
            ));
            self.ctx.kv(
                "Checked:",
                &report.checked_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            );
            println!();
        }

        if report.passed {
            self.ctx.success("All checks passed");
            return;
        }
        for violation in &report.violations {
            self.ctx.violation(violation);
        }
        if !self.ctx.quiet {
            println!();
            self.ctx
                .warn(&format!("{} violation(s)", report.violations.len()));
        }
    }

    /// Render per-port observations.
    pub fn render_observations(&self, observations: &[PortObservation]) {
        if self.ctx.quiet {
            return;
        }
        for obs in observations {
            let state = if obs.is_open { "open" } else { "closed" };
            let direction = match obs.direction {
                Some(PortDirection::Inbound) => "inbound",
                Some(PortDirection::Outbound) => "outbound",
                None => "unclassified",
            };
            println!(
                "  {:<6} {:<9} {}",
                obs.port,
                direction.style(self.ctx.styles.dim),
                state.style(if obs.is_open {
                    self.ctx.styles.success
                } else {
                    self.ctx.styles.warning
                })
            );
        }
    }

    /// Render the current configuration.
    pub fn render_config(&self, config: &ProvcheckConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        for (key, value) in config_rows(config) {
            println!("  {:<30} {value}", format!("{key}:"));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["PROVCHECK_CONFIG", "RUST_LOG", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}

/// Flatten the config into `(key, value)` rows in settable-key order.
#[must_use]
pub fn config_rows(config: &ProvcheckConfig) -> Vec<(&'static str, String)> {
    vec![
        ("connect.max_attempts", config.connect.max_attempts.to_string()),
        (
            "connect.initial_delay_secs",
            config.connect.initial_delay_secs.to_string(),
        ),
        (
            "connect.backoff_factor",
            config.connect.backoff_factor.to_string(),
        ),
        ("connect.timeout_secs", config.connect.timeout_secs.to_string()),
        (
            "connect.private_key_path",
            config.connect.private_key_path.clone(),
        ),
        ("install.retry_count", config.install.retry_count.to_string()),
        ("install.delay_secs", config.install.delay_secs.to_string()),
        (
            "policy.zero_tier_marker",
            config.policy.zero_tier_marker.clone(),
        ),
        (
            "policy.ssh_test_interface",
            config.policy.ssh_test_interface.clone(),
        ),
    ]
}
