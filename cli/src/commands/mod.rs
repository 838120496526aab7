//! Command implementations

pub mod check;
pub mod config;
pub mod probe;
pub mod version;

use anyhow::Result;
use provcheck_common::CheckReport;
use std::process::ExitCode;

use crate::app::AppContext;
use crate::domain::address::{IpFamily, extract_host};
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Pick the server address out of free text such as a panel details row.
///
/// # Errors
///
/// Returns an error if no address of the requested family is present.
pub fn resolve_host(text: &str, ipv6: bool) -> Result<String> {
    let family = if ipv6 { IpFamily::V6 } else { IpFamily::V4 };
    Ok(extract_host(text, family)?)
}

/// Clap value parser for package and OS labels: trimmed, never blank.
///
/// A blank zero-tier marker would match every package label.
///
/// # Errors
///
/// Returns an error if nothing is left after trimming.
pub fn parse_label(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("expected a non-empty value".to_string());
    }
    Ok(trimmed.to_string())
}

/// Render a finished report and map it to the process exit code.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn finish_report(app: &AppContext, report: &CheckReport) -> Result<ExitCode> {
    if app.is_json() {
        println!("{}", json::format_report(report)?);
    } else {
        let renderer = HumanRenderer::new(&app.output);
        renderer.render_observations(&report.ports);
        renderer.render_check_report(report);
    }
    Ok(if report.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
