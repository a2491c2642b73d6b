//! Configuration validation
//!
//! Validates experiment configurations before any data is read.

mod error;
mod validator;

#[cfg(test)]
mod proptests;

pub use error::ValidationError;
pub use validator::{validate_config, validate_paths};
