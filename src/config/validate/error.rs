//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Unknown model: {0} (run `refactorml models` for the list)")]
    UnknownModel(String),

    #[error("Duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },

    #[error("Invalid {name}: {value} (must be >= 2)")]
    InvalidFolds { name: &'static str, value: usize },

    #[error("Invalid n_iter_random_search: {0} (must be > 0)")]
    InvalidIterations(usize),

    #[error("Invalid grid_points: {0} (must be >= 2)")]
    InvalidGridPoints(usize),

    #[error("Model {model} cannot run in the {pipeline} pipeline")]
    PipelineMismatch { model: String, pipeline: &'static str },

    #[error("Empty name in {0}")]
    EmptyName(&'static str),

    #[error("Feature root does not exist: {0}")]
    FeatureRootNotFound(String),

    #[error("Label column cannot be empty")]
    EmptyLabelColumn,
}
