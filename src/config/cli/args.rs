//! CLI types - Cli, Command, and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ExperimentConfig;
use crate::pipeline::SearchKind;

/// refactorml: refactoring-prediction model training
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "refactorml")]
#[command(version)]
#[command(about = "Train binary refactoring classifiers over datasets, refactorings and models")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train every configured model on every dataset and refactoring
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// List the registered models
    Models,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq, Default)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override the search strategy (randomized, grid)
    #[arg(long)]
    pub search: Option<SearchKind>,

    /// Override the number of evaluation folds
    #[arg(long)]
    pub n_cv: Option<usize>,

    /// Override the number of folds inside the search
    #[arg(long)]
    pub n_cv_search: Option<usize>,

    /// Override the number of randomized-search candidates
    #[arg(long)]
    pub n_iter: Option<usize>,

    /// Override the training seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override where models are written
    #[arg(short, long)]
    pub models_dir: Option<PathBuf>,

    /// Override where the JSON report is written
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Dry run (validate config but don't train)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show the resolved configuration
    #[arg(short, long)]
    pub detailed: bool,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to an experiment configuration
pub fn apply_overrides(config: &mut ExperimentConfig, args: &TrainArgs) {
    if let Some(search) = args.search {
        config.training.search = search;
    }
    if let Some(n_cv) = args.n_cv {
        config.training.n_cv = n_cv;
    }
    if let Some(n_cv_search) = args.n_cv_search {
        config.training.n_cv_search = n_cv_search;
    }
    if let Some(n_iter) = args.n_iter {
        config.training.n_iter_random_search = n_iter;
    }
    if let Some(seed) = args.seed {
        config.training.seed = seed;
    }
    if let Some(models_dir) = &args.models_dir {
        config.output.models_dir = models_dir.clone();
    }
    if let Some(report) = &args.report {
        config.output.report = Some(report.clone());
    }
}
