//! Experiment configuration
//!
//! An experiment is described in YAML: datasets, refactorings and model names,
//! the pipeline variant, search and evaluation settings, the feature store and
//! output locations. See [`ExperimentConfig`].

mod cli;
mod loader;
mod schema;
mod validate;

pub use cli::{apply_overrides, parse_args, Cli, Command, TrainArgs, ValidateArgs};
pub use loader::{load_config, parse_config};
pub use schema::{ExperimentConfig, FeatureConfig, OutputConfig, PipelineKind, TrainingParams};
pub use validate::{validate_config, validate_paths, ValidationError};
