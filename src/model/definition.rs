//! Model definition capabilities

use ndarray::{Array1, Array2};

use super::classifier::Classifier;
use super::outcome::TrainedOutcome;
use crate::data::{Dataset, Scaler};
use crate::error::{Error, Result};
use crate::search::{HyperparameterSpace, ParamSet};

/// Describes a trainable model and how its results are kept
///
/// Only `name` and `persist` are mandatory. The remaining capabilities are
/// optional and default to [`Error::Unsupported`]; which ones are needed
/// depends on the [`TrainingStrategy`](crate::pipeline::TrainingStrategy):
///
/// - search strategy: `model`, `model_with`, `params_to_tune`
/// - delegated strategy: `run`
pub trait ModelDefinition: Send + Sync {
    /// Display name, also used in artifact paths
    fn name(&self) -> &str;

    /// Fresh untrained instance with default hyperparameters
    fn model(&self) -> Result<Box<dyn Classifier>> {
        Err(Error::unsupported(self.name(), "model"))
    }

    /// Fresh untrained instance configured with `params`
    fn model_with(&self, params: &ParamSet) -> Result<Box<dyn Classifier>> {
        let _ = params;
        Err(Error::unsupported(self.name(), "model_with"))
    }

    /// Space searched during hyperparameter tuning
    fn params_to_tune(&self) -> Result<HyperparameterSpace> {
        Err(Error::unsupported(self.name(), "params_to_tune"))
    }

    /// Self-managed training: validate internally, then fit on all of `(x, y)`
    fn run(&self, x: &Array2<f64>, y: &Array1<usize>, seed: u64) -> Result<TrainedOutcome> {
        let _ = (x, y, seed);
        Err(Error::unsupported(self.name(), "run"))
    }

    /// Store the trained model together with what is needed to apply it
    fn persist(
        &self,
        dataset: &Dataset,
        refactoring: &str,
        features: &[String],
        model: &dyn Classifier,
        scaler: &Scaler,
    ) -> Result<()>;
}
