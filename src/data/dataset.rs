//! Datasets, refactoring labels and feature sets

use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::scaler::Scaler;
use crate::error::{Error, Result};

/// Identifier of a data source (a project, or a group of projects)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(String);

impl Dataset {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Dataset {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Code element a refactoring operates on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefactoringLevel {
    #[default]
    Class,
    Method,
    Variable,
    Field,
}

impl fmt::Display for RefactoringLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefactoringLevel::Class => "class",
            RefactoringLevel::Method => "method",
            RefactoringLevel::Variable => "variable",
            RefactoringLevel::Field => "field",
        };
        f.write_str(name)
    }
}

/// A refactoring type used as the prediction target
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Refactoring {
    name: String,
    #[serde(default)]
    level: RefactoringLevel,
}

impl Refactoring {
    pub fn new<S: Into<String>>(name: S, level: RefactoringLevel) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> RefactoringLevel {
        self.level
    }
}

impl fmt::Display for Refactoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.level)
    }
}

/// Labelled, scaled instances for one (dataset, refactoring) pair
#[derive(Clone, Debug)]
pub struct FeatureSet {
    /// Column names of `x`, in order
    pub features: Vec<String>,
    /// Scaled feature matrix, one row per instance
    pub x: Array2<f64>,
    /// Labels: 1 = refactored, 0 = not refactored
    pub y: Array1<usize>,
    /// Scaler fitted on the raw features
    pub scaler: Scaler,
}

impl FeatureSet {
    /// Build a feature set, checking that the parts agree in shape
    pub fn new(
        features: Vec<String>,
        x: Array2<f64>,
        y: Array1<usize>,
        scaler: Scaler,
    ) -> Result<Self> {
        if features.len() != x.ncols() {
            return Err(Error::InvalidData(format!(
                "{} feature names for {} columns",
                features.len(),
                x.ncols()
            )));
        }
        if x.nrows() != y.len() {
            return Err(Error::InvalidData(format!(
                "{} rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        Ok(Self {
            features,
            x,
            y,
            scaler,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    pub fn n_positive(&self) -> usize {
        self.y.iter().filter(|&&label| label == 1).count()
    }
}
