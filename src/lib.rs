//! refactorml: refactoring-prediction training orchestrator
//!
//! Trains binary classifiers that predict whether a code element will be
//! refactored. For every dataset, refactoring and model the orchestrator
//! retrieves labelled features, tunes hyperparameters with a stratified
//! k-fold search, cross-validates the winner, refits it on all instances
//! and persists the result.
//!
//! # Example
//!
//! ```no_run
//! use refactorml::config::load_config;
//!
//! let config = load_config("experiment.yaml")?;
//! let report = config.orchestrator()?.run()?;
//! println!("{report}");
//! # Ok::<(), refactorml::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
pub mod search;

pub use error::{Error, Result};
