//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
///
/// All three are suppressed when `ctx.quiet` or when built with [`Self::silent`].
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    silent: bool,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx, silent: false }
    }

    /// Reporter that prints nothing, for `--json` runs where stdout carries
    /// the document.
    #[must_use]
    pub fn silent(ctx: &'a OutputContext) -> Self {
        Self { ctx, silent: true }
    }

    fn enabled(&self) -> bool {
        !self.silent && !self.ctx.quiet
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.enabled() {
            println!("  {} {message}", "→".style(self.ctx.styles.step));
        }
    }

    fn success(&self, message: &str) {
        if self.enabled() {
            println!("  {} {message}", "✓".style(self.ctx.styles.success));
        }
    }

    fn warn(&self, message: &str) {
        if self.enabled() {
            println!("  {} {message}", "!".style(self.ctx.styles.warning));
        }
    }
}
