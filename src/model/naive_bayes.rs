//! Gaussian naive Bayes

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::classifier::{check_fit_input, check_predict_input, Classifier};
use super::definition::ModelDefinition;
use super::store::{ModelArtifact, ModelStore};
use crate::data::{Dataset, Scaler};
use crate::error::{Error, Result};
use crate::search::{HyperparameterSpace, ParamSet, ParameterDomain};

const NAME: &str = "gaussian_nb";

/// Per-class means and variances of each feature
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ClassStats {
    log_prior: f64,
    mean: Array1<f64>,
    var: Array1<f64>,
}

impl ClassStats {
    fn joint_log_likelihood(&self, row: ArrayView1<'_, f64>) -> f64 {
        let ll: f64 = row
            .iter()
            .zip(self.mean.iter().zip(self.var.iter()))
            .map(|(&v, (&m, &s2))| {
                -0.5 * ((2.0 * std::f64::consts::PI * s2).ln() + (v - m).powi(2) / s2)
            })
            .sum();
        self.log_prior + ll
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GaussianNb {
    /// Fraction of the largest feature variance added to every variance
    pub var_smoothing: f64,
    classes: Option<[ClassStats; 2]>,
}

impl Default for GaussianNb {
    fn default() -> Self {
        Self {
            var_smoothing: 1e-9,
            classes: None,
        }
    }
}

impl GaussianNb {
    pub fn from_params(params: &ParamSet) -> Result<Self> {
        let var_smoothing = params.float_or("var_smoothing", 1e-9)?;
        if !(var_smoothing >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "{NAME}: var_smoothing must be >= 0, got {var_smoothing}"
            )));
        }
        Ok(Self {
            var_smoothing,
            classes: None,
        })
    }

    fn stats_for(x: &Array2<f64>, n_total: usize, epsilon: f64) -> Result<ClassStats> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::fit(NAME, "class has no instances"))?;
        let var = x.var_axis(Axis(0), 0.0) + epsilon;
        Ok(ClassStats {
            log_prior: (x.nrows() as f64 / n_total as f64).ln(),
            mean,
            var,
        })
    }
}

impl Classifier for GaussianNb {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, usize>) -> Result<()> {
        check_fit_input(NAME, &x, &y)?;

        let max_var = x.var_axis(Axis(0), 0.0).fold(0.0_f64, |acc, &v| acc.max(v));
        // Keep variances strictly positive even on constant data.
        let epsilon = (self.var_smoothing * max_var).max(f64::MIN_POSITIVE);

        let rows_of = |label: usize| -> Vec<usize> {
            y.iter()
                .enumerate()
                .filter(|(_, &l)| l == label)
                .map(|(i, _)| i)
                .collect()
        };
        let (neg, pos) = (rows_of(0), rows_of(1));
        if neg.is_empty() || pos.is_empty() {
            return Err(Error::fit(NAME, "both classes must be present"));
        }

        let n = y.len();
        self.classes = Some([
            Self::stats_for(&x.select(Axis(0), &neg), n, epsilon)?,
            Self::stats_for(&x.select(Axis(0), &pos), n, epsilon)?,
        ]);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<usize>> {
        check_predict_input(NAME, &x, self.classes.as_ref().map(|c| c[0].mean.len()))?;
        let [neg, pos] = self
            .classes
            .as_ref()
            .ok_or_else(|| Error::fit(NAME, "not fitted"))?;

        Ok(x
            .rows()
            .into_iter()
            .map(|row| usize::from(pos.joint_log_likelihood(row) > neg.joint_log_likelihood(row)))
            .collect())
    }

    fn params(&self) -> ParamSet {
        ParamSet::new().with("var_smoothing", self.var_smoothing)
    }

    fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Search-driven definition for [`GaussianNb`]
#[derive(Clone, Debug)]
pub struct GaussianNbDef {
    store: ModelStore,
}

impl GaussianNbDef {
    pub fn new(store: ModelStore) -> Self {
        Self { store }
    }
}

impl ModelDefinition for GaussianNbDef {
    fn name(&self) -> &str {
        NAME
    }

    fn model(&self) -> Result<Box<dyn Classifier>> {
        Ok(Box::new(GaussianNb::default()))
    }

    fn model_with(&self, params: &ParamSet) -> Result<Box<dyn Classifier>> {
        Ok(Box::new(GaussianNb::from_params(params)?))
    }

    fn params_to_tune(&self) -> Result<HyperparameterSpace> {
        Ok(HyperparameterSpace::new().with(
            "var_smoothing",
            ParameterDomain::Continuous {
                low: 1e-12,
                high: 1e-2,
                log_scale: true,
            },
        ))
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
