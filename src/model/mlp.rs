//! One-hidden-layer perceptron that manages its own evaluation
//!
//! [`MlpDef`] is a delegated definition: it exposes no search space and
//! trains through [`ModelDefinition::run`], which cross-validates with the
//! seed it is given and then fits on every instance.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::classifier::{check_fit_input, check_predict_input, Classifier};
use super::definition::ModelDefinition;
use super::outcome::TrainedOutcome;
use super::store::{ModelArtifact, ModelStore};
use crate::data::{Dataset, Scaler};
use crate::error::{Error, Result};
use crate::eval::{cross_validate, Scorer, StratifiedKFold};
use crate::search::ParamSet;

const NAME: &str = "mlp";

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Layers {
    w1: Array2<f64>,
    b1: Array1<f64>,
    w2: Array1<f64>,
    b2: f64,
}

impl Layers {
    /// Xavier-uniform initialisation
    fn init(n_in: usize, hidden: usize, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (n_in + hidden) as f64).sqrt();
        let w1 = Array2::from_shape_simple_fn((n_in, hidden), || rng.random_range(-limit..limit));
        let limit = (6.0 / (hidden + 1) as f64).sqrt();
        let w2 = Array1::from_shape_simple_fn(hidden, || rng.random_range(-limit..limit));
        Self {
            w1,
            b1: Array1::zeros(hidden),
            w2,
            b2: 0.0,
        }
    }

    fn hidden(&self, x: &ArrayView2<'_, f64>) -> Array2<f64> {
        (x.dot(&self.w1) + &self.b1).mapv(|z| z.max(0.0))
    }

    fn output(&self, h: &Array2<f64>) -> Array1<f64> {
        (h.dot(&self.w2) + self.b2).mapv(|z| 1.0 / (1.0 + (-z).exp()))
    }

    /// One gradient step on a mini-batch of binary cross-entropy
    fn step(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>, learning_rate: f64) {
        let m = x.nrows() as f64;
        let h = self.hidden(&x);
        let p = self.output(&h);

        let d_out = (&p - &y) / m;
        let grad_w2 = h.t().dot(&d_out);
        let grad_b2 = d_out.sum();

        let mut d_h = &d_out.view().insert_axis(Axis(1)) * &self.w2.view().insert_axis(Axis(0));
        // ReLU passes gradient only where the unit was active.
        d_h.zip_mut_with(&h, |g, &a| {
            if a <= 0.0 {
                *g = 0.0;
            }
        });
        let grad_w1 = x.t().dot(&d_h);
        let grad_b1 = d_h.sum_axis(Axis(0));

        self.w1.scaled_add(-learning_rate, &grad_w1);
        self.b1.scaled_add(-learning_rate, &grad_b1);
        self.w2.scaled_add(-learning_rate, &grad_w2);
        self.b2 -= learning_rate * grad_b2;
    }
}

/// Binary MLP: ReLU hidden layer, sigmoid output, mini-batch SGD
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mlp {
    pub hidden: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    pub seed: u64,
    layers: Option<Layers>,
}

impl Mlp {
    pub fn new(
        hidden: usize,
        epochs: usize,
        learning_rate: f64,
        batch_size: usize,
        seed: u64,
    ) -> Self {
        Self {
            hidden,
            epochs,
            learning_rate,
            batch_size,
            seed,
            layers: None,
        }
    }
}

impl Default for Mlp {
    fn default() -> Self {
        Self::new(16, 200, 0.05, 32, 42)
    }
}

impl Classifier for Mlp {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, usize>) -> Result<()> {
        check_fit_input(NAME, &x, &y)?;
        if self.hidden == 0 || self.batch_size == 0 {
            return Err(Error::InvalidParameter(format!(
                "{NAME}: hidden and batch_size must be positive"
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut layers = Layers::init(x.ncols(), self.hidden, &mut rng);
        let targets = y.mapv(|l| l as f64);
        let mut order: Vec<usize> = (0..x.nrows()).collect();

        for _ in 0..self.epochs {
            order.shuffle(&mut rng);
            for batch in order.chunks(self.batch_size) {
                let xb = x.select(Axis(0), batch);
                let yb = targets.select(Axis(0), batch);
                layers.step(xb.view(), yb.view(), self.learning_rate);
            }
        }

        if layers.w1.iter().chain(layers.w2.iter()).any(|w| !w.is_finite()) {
            return Err(Error::fit(NAME, "weights diverged"));
        }
        self.layers = Some(layers);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<usize>> {
        check_predict_input(NAME, &x, self.layers.as_ref().map(|l| l.w1.nrows()))?;
        let layers = self.layers.as_ref().ok_or_else(|| Error::fit(NAME, "not fitted"))?;
        let p = layers.output(&layers.hidden(&x));
        Ok(p.mapv(|v| usize::from(v >= 0.5)))
    }

    fn params(&self) -> ParamSet {
        ParamSet::new()
            .with("hidden", self.hidden as i64)
            .with("epochs", self.epochs as i64)
            .with("learning_rate", self.learning_rate)
            .with("batch_size", self.batch_size as i64)
    }

    fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Delegated definition for [`Mlp`]
#[derive(Clone, Debug)]
pub struct MlpDef {
    store: ModelStore,
    n_folds: usize,
    parallel: bool,
    template: Mlp,
}

impl MlpDef {
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            n_folds: 5,
            parallel: true,
            template: Mlp::default(),
        }
    }

    /// Folds used by the internal evaluation
    pub fn with_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    /// Run the internal evaluation's folds on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn with_architecture(mut self, hidden: usize, epochs: usize, learning_rate: f64) -> Self {
        self.template.hidden = hidden;
        self.template.epochs = epochs;
        self.template.learning_rate = learning_rate;
        self
    }

    fn seeded(&self, seed: u64) -> Mlp {
        Mlp {
            seed,
            layers: None,
            ..self.template.clone()
        }
    }
}

impl ModelDefinition for MlpDef {
    fn name(&self) -> &str {
        NAME
    }

    fn run(&self, x: &Array2<f64>, y: &Array1<usize>, seed: u64) -> Result<TrainedOutcome> {
        let cv = StratifiedKFold::new(self.n_folds).with_seed(seed);
        let factory = || -> Result<Box<dyn Classifier>> { Ok(Box::new(self.seeded(seed))) };
        let scores = cross_validate(factory, x, y, &cv, &Scorer::EVALUATION, self.parallel)?;

        let mut model = self.seeded(seed);
        model.fit(x.view(), y.view())?;
        tracing::debug!(folds = scores.n_folds(), "mlp trained");

        TrainedOutcome::from_cv(&scores, Box::new(model))
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
