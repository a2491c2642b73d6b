//! Logging utilities for CLI output

/// Log level for CLI output
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    /// Level selected by the global `-q` / `-v` flags; quiet wins
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Quiet => "refactorml=error",
            LogLevel::Normal => "refactorml=info",
            LogLevel::Verbose => "refactorml=debug",
        }
    }
}

/// Log a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}
