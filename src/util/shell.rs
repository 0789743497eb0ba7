//! Status output for the CLI.
//!
//! Commands report what happened through a [`Shell`] so every status line
//! has the same right-aligned, optionally colored prefix. Output goes to
//! stderr; stdout is reserved for rendered code, reports and graphs.

use std::fmt::Display;
use std::io::{self, IsTerminal};

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    Always,
    Never,
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Generated,
    Fresh,

    // In-progress statuses (cyan)
    Resolving,

    // Info statuses (blue)
    Unchanged,
    Removed,

    // Warning statuses (yellow)
    Stale,
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Generated => "Generated",
            Status::Fresh => "Fresh",
            Status::Resolving => "Resolving",
            Status::Unchanged => "Unchanged",
            Status::Removed => "Removed",
            Status::Stale => "Stale",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Generated | Status::Fresh => "\x1b[1;32m",
            Status::Resolving => "\x1b[1;36m",
            Status::Unchanged | Status::Removed => "\x1b[1;34m",
            Status::Stale | Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Width status labels are right-aligned to.
const STATUS_WIDTH: usize = 12;

/// Central shell for CLI status output.
#[derive(Debug, Clone)]
pub struct Shell {
    use_color: bool,
    verbose: bool,
}

impl Shell {
    pub fn new(color: ColorChoice, verbose: bool) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Shell { use_color, verbose }
    }

    /// Create a shell from the global CLI flags.
    pub fn from_flags(no_color: bool, verbose: bool) -> Self {
        let color = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Shell::new(color, verbose)
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    pub fn status(&self, status: Status, msg: impl Display) {
        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print a status message only in verbose mode.
    pub fn verbose_status(&self, status: Status, msg: impl Display) {
        if self.verbose {
            self.status(status, msg);
        }
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    fn format_status(&self, status: Status) -> String {
        let label = format!("{:>width$}", status.as_str(), width = STATUS_WIDTH);
        if self.use_color {
            format!("{}{}\x1b[0m", status.color_code(), label)
        } else {
            label
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ColorChoice::Auto, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_alignment() {
        let shell = Shell::new(ColorChoice::Never, false);
        assert_eq!(shell.format_status(Status::Generated), "   Generated");
        assert_eq!(shell.format_status(Status::Error), "       error");
    }

    #[test]
    fn test_status_color() {
        let shell = Shell::new(ColorChoice::Always, false);
        let s = shell.format_status(Status::Stale);
        assert!(s.starts_with("\x1b[1;33m"));
        assert!(s.ends_with("\x1b[0m"));
    }

    #[test]
    fn test_from_flags() {
        assert!(!Shell::from_flags(true, false).use_color());
        assert!(Shell::from_flags(true, true).is_verbose());
    }
}
