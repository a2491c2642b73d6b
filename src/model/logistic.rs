//! L2-regularized logistic regression trained with batch gradient descent

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::classifier::{check_fit_input, check_predict_input, Classifier};
use super::definition::ModelDefinition;
use super::store::{ModelArtifact, ModelStore};
use crate::data::{Dataset, Scaler};
use crate::error::{Error, Result};
use crate::search::{HyperparameterSpace, ParamSet, ParameterDomain};

const NAME: &str = "logistic_regression";

/// Per-class weighting of the loss
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    None,
    /// Weight classes inversely to their frequency
    Balanced,
}

/// Logistic regression classifier
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub max_iter: usize,
    pub l2: f64,
    pub tol: f64,
    pub class_weight: ClassWeight,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 500,
            l2: 1e-4,
            tol: 1e-6,
            class_weight: ClassWeight::None,
            weights: None,
            bias: 0.0,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticRegression {
    /// Build from a configuration, falling back to defaults for absent keys
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let defaults = Self::default();
        let learning_rate = params.float_or("learning_rate", defaults.learning_rate)?;
        let max_iter = params.int_or("max_iter", defaults.max_iter as i64)?;
        let l2 = params.float_or("l2", defaults.l2)?;
        let class_weight = match params.str_or("class_weight", "none")? {
            "none" => ClassWeight::None,
            "balanced" => ClassWeight::Balanced,
            other => {
                return Err(Error::InvalidParameter(format!(
                    "class_weight must be 'none' or 'balanced', got '{other}'"
                )))
            }
        };

        if !(learning_rate > 0.0) || max_iter < 1 || l2 < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "{NAME}: need learning_rate > 0, max_iter >= 1, l2 >= 0 (got {params})"
            )));
        }

        Ok(Self {
            learning_rate,
            max_iter: max_iter as usize,
            l2,
            class_weight,
            ..defaults
        })
    }

    /// Positive-class probability per row
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        check_predict_input(NAME, &x, self.weights.as_ref().map(Array1::len))?;
        let weights = self.weights.as_ref().ok_or_else(|| Error::fit(NAME, "not fitted"))?;
        Ok((x.dot(weights) + self.bias).mapv(sigmoid))
    }

    fn sample_weights(&self, y: &ArrayView1<'_, usize>) -> Array1<f64> {
        match self.class_weight {
            ClassWeight::None => Array1::ones(y.len()),
            ClassWeight::Balanced => {
                let n = y.len() as f64;
                let n_pos = y.iter().filter(|&&l| l == 1).count().max(1) as f64;
                let n_neg = (y.len() as f64 - n_pos).max(1.0);
                y.mapv(|l| if l == 1 { n / (2.0 * n_pos) } else { n / (2.0 * n_neg) })
            }
        }
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, usize>) -> Result<()> {
        check_fit_input(NAME, &x, &y)?;

        let n = x.nrows() as f64;
        let targets = y.mapv(|l| l as f64);
        let sample_weights = self.sample_weights(&y);
        let mut w = Array1::<f64>::zeros(x.ncols());
        let mut b = 0.0;

        for _ in 0..self.max_iter {
            let p = (x.dot(&w) + b).mapv(sigmoid);
            let err = (&p - &targets) * &sample_weights;
            let grad_w = x.t().dot(&err) / n + &w * self.l2;
            let grad_b = err.sum() / n;

            w = w - &grad_w * self.learning_rate;
            b -= self.learning_rate * grad_b;

            let norm = grad_w.dot(&grad_w).sqrt() + grad_b.abs();
            if !norm.is_finite() {
                return Err(Error::fit(NAME, "gradient diverged"));
            }
            if norm < self.tol {
                break;
            }
        }

        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<usize>> {
        Ok(self.predict_proba(x)?.mapv(|p| usize::from(p >= 0.5)))
    }

    fn params(&self) -> ParamSet {
        let class_weight = match self.class_weight {
            ClassWeight::None => "none",
            ClassWeight::Balanced => "balanced",
        };
        ParamSet::new()
            .with("learning_rate", self.learning_rate)
            .with("max_iter", self.max_iter as i64)
            .with("l2", self.l2)
            .with("class_weight", class_weight)
    }

    fn feature_weights(&self) -> Option<Array1<f64>> {
        self.weights.clone()
    }

    fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Search-driven definition for [`LogisticRegression`]
#[derive(Clone, Debug)]
pub struct LogisticRegressionDef {
    store: ModelStore,
}

impl LogisticRegressionDef {
    pub fn new(store: ModelStore) -> Self {
        Self { store }
    }
}

impl ModelDefinition for LogisticRegressionDef {
    fn name(&self) -> &str {
        NAME
    }

    fn model(&self) -> Result<Box<dyn Classifier>> {
        Ok(Box::new(LogisticRegression::default()))
    }

    fn model_with(&self, params: &ParamSet) -> Result<Box<dyn Classifier>> {
        Ok(Box::new(LogisticRegression::from_params(params)?))
    }

    fn params_to_tune(&self) -> Result<HyperparameterSpace> {
        Ok(HyperparameterSpace::new()
            .with(
                "learning_rate",
                ParameterDomain::Continuous {
                    low: 1e-3,
                    high: 1.0,
                    log_scale: true,
                },
            )
            .with("max_iter", ParameterDomain::choice([100_i64, 300, 1000]))
            .with(
                "l2",
                ParameterDomain::Continuous {
                    low: 1e-5,
                    high: 1e-1,
                    log_scale: true,
                },
            )
            .with("class_weight", ParameterDomain::choice(["none", "balanced"])))
    }

    fn persist(
        &self,
        dataset: &Dataset,
        refactoring: &str,
        features: &[String],
        model: &dyn Classifier,
        scaler: &Scaler,
    ) -> Result<()> {
        let artifact =
            ModelArtifact::new(dataset, refactoring, self.name(), features, model, scaler)?;
        self.store.save(&artifact)?;
        Ok(())
    }
}
