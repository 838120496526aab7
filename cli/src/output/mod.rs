//! Output formatting module

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use styles::Styles;

/// Styling and verbosity shared by every human-readable writer.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

/// Colors only reach an interactive stdout, and never when `NO_COLOR` is set.
#[must_use]
pub fn colors_enabled(no_color_flag: bool, is_tty: bool, no_color_env: bool) -> bool {
    !no_color_flag && !no_color_env && is_tty
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let mut styles = Styles::default();
        if colors_enabled(
            no_color,
            Term::stdout().is_term(),
            std::env::var_os("NO_COLOR").is_some(),
        ) {
            styles.colorize();
        }
        Self { styles, quiet }
    }

    /// `✓ msg`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// `⚠ msg`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// One failed check on stdout. Never suppressed: the violation list is
    /// the result of a run.
    pub fn violation(&self, msg: &str) {
        println!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// A command failure on stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("{} {msg}", "Error:".style(self.styles.error));
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.header));
        }
    }

    /// Key dimmed, value plain.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}
