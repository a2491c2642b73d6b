//! Feature normalization

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which normalizer to fit on retrieved features
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    #[default]
    MinMax,
    Standard,
    None,
}

/// A fitted normalizer, persisted next to each model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    Identity,
    /// Maps each column to [0, 1]
    MinMax { min: Vec<f64>, max: Vec<f64> },
    /// Zero mean, unit variance per column
    Standard { mean: Vec<f64>, std: Vec<f64> },
}

impl Scaler {
    /// Fit the requested scaling on `x`
    pub fn fit(scaling: Scaling, x: &Array2<f64>) -> Self {
        if x.nrows() == 0 {
            return Scaler::Identity;
        }
        match scaling {
            Scaling::None => Scaler::Identity,
            Scaling::MinMax => {
                let min = x.fold_axis(Axis(0), f64::INFINITY, |a, &b| a.min(b));
                let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |a, &b| a.max(b));
                Scaler::MinMax {
                    min: min.to_vec(),
                    max: max.to_vec(),
                }
            }
            Scaling::Standard => {
                let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
                let std = x.std_axis(Axis(0), 0.0);
                Scaler::Standard {
                    mean: mean.to_vec(),
                    std: std.to_vec(),
                }
            }
        }
    }

    /// Apply the fitted transform to `x`
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (offset, scale) = match self {
            Scaler::Identity => return Ok(x.clone()),
            Scaler::MinMax { min, max } => {
                let range: Vec<f64> = min.iter().zip(max).map(|(lo, hi)| hi - lo).collect();
                (min.clone(), range)
            }
            Scaler::Standard { mean, std } => (mean.clone(), std.clone()),
        };

        if offset.len() != x.ncols() {
            return Err(Error::InvalidData(format!(
                "scaler fitted on {} features, got {}",
                offset.len(),
                x.ncols()
            )));
        }

        // Constant columns keep a unit scale so they map to 0.
        let scale = Array1::from_iter(scale.into_iter().map(|s| if s > 0.0 { s } else { 1.0 }));
        let offset = Array1::from_vec(offset);
        Ok((x - &offset) / &scale)
    }

    pub fn fit_transform(scaling: Scaling, x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(scaling, x);
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }
}
