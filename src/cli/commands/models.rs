//! Models command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::model::registry::AVAILABLE;

pub fn format_models() -> String {
    let width = AVAILABLE.iter().map(|m| m.name.len()).max().unwrap_or(0);
    AVAILABLE
        .iter()
        .map(|m| {
            let pipeline = if m.delegated { "deep_learning" } else { "binary" };
            format!("  {:<width$}  [{pipeline}] {}", m.name, m.description)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run_models(level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, "Registered models:");
    log(level, LogLevel::Normal, &format_models());
    Ok(())
}
