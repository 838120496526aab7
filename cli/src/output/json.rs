//! JSON output helpers.
//!
//! Used by every `--json` code path. Reports serialize as-is; failures use a
//! fixed error object.

use anyhow::{Context, Result};
use provcheck_common::{CheckReport, PortObservation};
use serde::Serialize;

use crate::domain::config::ProvcheckConfig;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Pretty-print a check report.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &CheckReport) -> Result<String> {
    pretty(report)
}

/// Pretty-print inbound probe observations.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_observations(host: &str, observations: &[PortObservation]) -> Result<String> {
    let obj = serde_json::json!({
        "host": host,
        "ports": observations,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Pretty-print the effective configuration.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_config(config: &ProvcheckConfig) -> Result<String> {
    pretty(config)
}

fn pretty(value: &impl Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}
