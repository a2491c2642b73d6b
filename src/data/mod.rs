//! Labelled instance retrieval
//!
//! A [`FeatureSource`] turns a (dataset, refactoring) pair into a
//! [`FeatureSet`]: feature names, a scaled matrix, binary labels and the
//! fitted [`Scaler`]. [`CsvFeatureStore`] is the file-backed implementation.

mod csv_store;
mod dataset;
mod scaler;

pub use csv_store::CsvFeatureStore;
pub use dataset::{Dataset, FeatureSet, Refactoring, RefactoringLevel};
pub use scaler::{Scaler, Scaling};

use crate::error::Result;

/// Produces the labelled instances of one refactoring in one dataset
pub trait FeatureSource: Send + Sync {
    fn retrieve(&self, dataset: &Dataset, refactoring: &Refactoring) -> Result<FeatureSet>;
}
