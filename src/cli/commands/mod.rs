//! CLI command implementations

mod models;
mod train;
mod validate;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Models => models::run_models(log_level),
    }
}
