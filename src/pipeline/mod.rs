//! Batch training pipeline
//!
//! [`TrainingOrchestrator`] walks datasets, refactorings and models in the
//! order given, retrieves features once per (dataset, refactoring) pair and
//! trains each model with a [`TrainingStrategy`]:
//!
//! - [`TrainingStrategy::Search`] searches hyperparameters, cross-validates
//!   the winner and fits it on all instances;
//! - [`TrainingStrategy::Delegated`] lets the model definition train itself.
//!
//! Progress and results go to a [`LogSink`]; per-combination outcomes are
//! collected in a [`BatchReport`].

mod format;
mod log;
mod orchestrator;
mod report;
mod timing;
mod trainer;

#[cfg(test)]
mod tests;

pub use format::{format_best_parameters, format_results, TOP_FEATURES};
pub use log::{FileLog, LogSink, MemoryLog, TracingLog};
pub use orchestrator::{TrainingOrchestrator, DEFAULT_SEED};
pub use report::{BatchReport, CombinationError, CombinationOutcome, CombinationSummary};
pub use timing::{Lap, Stopwatch, Timer};
pub use trainer::{SearchKind, SearchSettings, TrainingStrategy};
