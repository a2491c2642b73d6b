//! Trainable binary classifier contract

use std::fmt;

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::{Error, Result};
use crate::search::ParamSet;

/// A binary classifier instance (labels 0 / 1)
///
/// Instances are produced untrained by a
/// [`ModelDefinition`](super::ModelDefinition); each fold of a search or
/// cross-validation gets its own instance, so implementations never need to
/// reset state between fits.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Short algorithm name
    fn name(&self) -> &str;

    /// Fit on a feature matrix and label vector
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, usize>) -> Result<()>;

    /// Predict labels for each row of `x`
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<usize>>;

    /// Hyperparameters this instance was built with
    fn params(&self) -> ParamSet;

    /// Per-feature weights, when the model has a linear notion of importance
    fn feature_weights(&self) -> Option<Array1<f64>> {
        None
    }

    /// Serializable snapshot of the fitted state
    fn export(&self) -> Result<serde_json::Value>;
}

/// Shared input checks for `fit` implementations
pub fn check_fit_input(
    model: &str,
    x: &ArrayView2<'_, f64>,
    y: &ArrayView1<'_, usize>,
) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(Error::fit(model, "empty feature matrix"));
    }
    if x.nrows() != y.len() {
        return Err(Error::fit(
            model,
            format!("x has {} rows but y has {} labels", x.nrows(), y.len()),
        ));
    }
    if let Some(bad) = y.iter().find(|&&label| label > 1) {
        return Err(Error::fit(model, format!("label {bad} is not binary")));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(Error::fit(model, "feature matrix contains NaN or infinite values"));
    }
    Ok(())
}

/// Shared input checks for `predict` implementations
pub fn check_predict_input(
    model: &str,
    x: &ArrayView2<'_, f64>,
    n_features: Option<usize>,
) -> Result<()> {
    match n_features {
        None => Err(Error::fit(model, "predict called before fit")),
        Some(n) if n != x.ncols() => Err(Error::InvalidData(format!(
            "{model}: expected {n} features, got {}",
            x.ncols()
        ))),
        Some(_) => Ok(()),
    }
}
