//! Search error types

use thiserror::Error;

/// Hyperparameter search errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("Invalid parameter value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Invalid domain for {0}: {1}")]
    InvalidDomain(String, String),

    #[error("Search needs at least one candidate (n_iter = 0)")]
    NoCandidates,
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
