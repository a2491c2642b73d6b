//! refactorml CLI
//!
//! # Usage
//!
//! ```bash
//! # Train every model on every dataset and refactoring
//! refactorml train experiment.yaml
//!
//! # Train with overrides
//! refactorml train experiment.yaml --search grid --n-cv 5 --seed 7
//!
//! # Validate config
//! refactorml validate experiment.yaml --detailed
//!
//! # List trainable models
//! refactorml models
//! ```
//!
//! `RUST_LOG` overrides the verbosity flags for the tracing output.

use clap::Parser;
use refactorml::cli::{run_command, Cli, LogLevel};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = LogLevel::from_flags(cli.verbose, cli.quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
