//! Firewall policy table and evaluator.
//!
//! Pure functions only. The table is fixed: inbound service ports must be
//! reachable, outbound mail-relay ports must never be, and the zero tier keeps
//! one extra inbound port closed.

use provcheck_common::PortDirection;

use crate::domain::probe::PortProbeResult;

// ── Rule table ───────────────────────────────────────────────────────────────

/// Inbound ports, in probe order.
pub const INBOUND_PORTS: [u16; 4] = [22, 443, 80, 1000];

/// Outbound mail ports, in probe order.
pub const OUTBOUND_PORTS: [u16; 3] = [25, 587, 467];

/// Inbound port that must stay closed for the zero tier.
pub const ZERO_TIER_CLOSED_PORT: u16 = 1000;

/// Package label marking the most restricted service tier.
pub const DEFAULT_ZERO_TIER_MARKER: &str = "CloudV 0";

/// Classify a port against the table. `None` for ports in neither set.
#[must_use]
pub fn classify(port: u16) -> Option<PortDirection> {
    if INBOUND_PORTS.contains(&port) {
        Some(PortDirection::Inbound)
    } else if OUTBOUND_PORTS.contains(&port) {
        Some(PortDirection::Outbound)
    } else {
        None
    }
}

/// Expected state of `port` for a package, or `None` if the table has no rule.
#[must_use]
pub fn expected_open(port: u16, package_label: &str, zero_tier_marker: &str) -> Option<bool> {
    match classify(port)? {
        PortDirection::Inbound => {
            let zero_tier = package_label.contains(zero_tier_marker);
            Some(!(zero_tier && port == ZERO_TIER_CLOSED_PORT))
        }
        PortDirection::Outbound => Some(false),
    }
}

// ── Evaluator ────────────────────────────────────────────────────────────────

/// Evaluate probe results and return one message per violated rule.
///
/// Entries are visited in insertion order. Ports without a rule are skipped.
#[must_use]
pub fn evaluate(results: &PortProbeResult, zero_tier_marker: &str) -> Vec<String> {
    let mut violations = Vec::new();
    for (port, record) in results.iter() {
        let package = record.package_label.as_str();
        let Some(expected) = expected_open(port, package, zero_tier_marker) else {
            tracing::warn!(port, package, "port has no policy rule; not evaluated");
            continue;
        };
        let direction = match classify(port) {
            Some(PortDirection::Outbound) => "outbound",
            _ => "inbound",
        };
        let state = state_word(record.is_open);
        if record.is_open == expected {
            tracing::info!("Port {direction} {port} is {state} for {package}");
        } else {
            tracing::error!("Port {direction} {port} is {state} for {package}");
            violations.push(violation(package, port, record.is_open));
        }
    }
    violations
}

fn state_word(is_open: bool) -> &'static str {
    if is_open { "open" } else { "closed" }
}

fn violation(package: &str, port: u16, is_open: bool) -> String {
    format!("{package} port {port} is {}.", state_word(is_open))
}
