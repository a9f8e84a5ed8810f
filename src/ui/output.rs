//! ui::output
//!
//! Human-facing output for the CLI.
//!
//! Command results go to stdout; notices and errors go to stderr. Quiet
//! mode suppresses everything except command results and errors. JSON
//! output bypasses this module entirely.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Results and errors only
    Quiet,
    /// Results, errors, confirmations and warnings
    Normal,
    /// Everything, including debug notes
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }

    fn allows(self, level: Verbosity) -> bool {
        self >= level
    }
}

/// Print an informational line to stdout.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity.allows(Verbosity::Normal) {
        println!("{}", message);
    }
}

/// Print a confirmation line to stdout.
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity.allows(Verbosity::Normal) {
        println!("{}", message);
    }
}

/// Print a warning to stderr.
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.allows(Verbosity::Normal) {
        eprintln!("warning: {}", message);
    }
}

/// Print a debug note to stderr.
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity.allows(Verbosity::Debug) {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error to stderr. Always shown.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}
