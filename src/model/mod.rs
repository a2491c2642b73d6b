//! Classifiers, model definitions and artifact persistence
//!
//! A [`Classifier`] is a single trainable instance. A [`ModelDefinition`]
//! knows how to create instances, what to tune, and how to persist the
//! result; the pipeline drives training through it.

mod classifier;
mod definition;
mod logistic;
mod mlp;
mod naive_bayes;
mod outcome;
pub mod registry;
mod store;

pub use classifier::{check_fit_input, check_predict_input, Classifier};
pub use definition::ModelDefinition;
pub use logistic::{ClassWeight, LogisticRegression, LogisticRegressionDef};
pub use mlp::{Mlp, MlpDef};
pub use naive_bayes::{GaussianNb, GaussianNbDef};
pub use outcome::TrainedOutcome;
pub use store::{ModelArtifact, ModelStore};
