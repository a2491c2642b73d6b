//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! refactorml train experiment.yaml
//! refactorml train experiment.yaml --search grid --n-cv 5
//! refactorml validate experiment.yaml
//! refactorml models
//! ```

mod args;

#[cfg(test)]
mod property_tests;

pub use args::{apply_overrides, parse_args, Cli, Command, TrainArgs, ValidateArgs};
