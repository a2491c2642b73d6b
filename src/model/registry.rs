//! Model definitions addressable by configuration name

use super::definition::ModelDefinition;
use super::logistic::LogisticRegressionDef;
use super::mlp::MlpDef;
use super::naive_bayes::GaussianNbDef;
use super::store::ModelStore;
use crate::error::{Error, Result};

/// A model the registry can build
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisteredModel {
    pub name: &'static str,
    pub description: &'static str,
    /// Trains itself through `ModelDefinition::run` instead of being searched
    pub delegated: bool,
}

pub const AVAILABLE: [RegisteredModel; 3] = [
    RegisteredModel {
        name: "logistic_regression",
        description: "L2-regularized logistic regression",
        delegated: false,
    },
    RegisteredModel {
        name: "gaussian_nb",
        description: "Gaussian naive Bayes",
        delegated: false,
    },
    RegisteredModel {
        name: "mlp",
        description: "one-hidden-layer perceptron with its own k-fold evaluation",
        delegated: true,
    },
];

pub fn lookup(name: &str) -> Option<&'static RegisteredModel> {
    AVAILABLE.iter().find(|m| m.name == name)
}

/// Settings handed to definitions that evaluate themselves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Folds of the internal evaluation
    pub n_folds: usize,
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            n_folds: 5,
            parallel: true,
        }
    }
}

fn mlp(store: &ModelStore, options: BuildOptions) -> MlpDef {
    MlpDef::new(store.clone())
        .with_folds(options.n_folds)
        .with_parallel(options.parallel)
}

/// Build the definition registered under `name`
pub fn build(
    name: &str,
    store: &ModelStore,
    options: BuildOptions,
) -> Result<Box<dyn ModelDefinition>> {
    let def: Box<dyn ModelDefinition> = match name {
        "logistic_regression" => Box::new(LogisticRegressionDef::new(store.clone())),
        "gaussian_nb" => Box::new(GaussianNbDef::new(store.clone())),
        "mlp" => Box::new(mlp(store, options)),
        other => return Err(Error::UnknownModel(other.to_string())),
    };
    Ok(def)
}

/// Build every name in order, failing on the first unknown one
pub fn build_all(
    names: &[String],
    store: &ModelStore,
    options: BuildOptions,
) -> Result<Vec<Box<dyn ModelDefinition>>> {
    names.iter().map(|name| build(name, store, options)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_model_builds() {
        let store = ModelStore::new("unused");
        for entry in AVAILABLE {
            let def = build(entry.name, &store, BuildOptions::default())
                .expect("registered model should build");
            assert_eq!(def.name(), entry.name);
            assert_eq!(lookup(entry.name), Some(&entry));
            // Searched models expose a space, delegated ones do not.
            assert_eq!(def.params_to_tune().is_err(), entry.delegated);
        }
    }

    #[test]
    fn test_unknown_model() {
        let store = ModelStore::new("unused");
        let err = build("random_forest", &store, BuildOptions::default())
            .err()
            .expect("should fail");
        assert!(matches!(err, Error::UnknownModel(ref n) if n == "random_forest"));
        assert!(lookup("random_forest").is_none());

        let names = vec!["gaussian_nb".to_string(), "svm".to_string()];
        assert!(build_all(&names, &store, BuildOptions::default()).is_err());
    }

    #[test]
    fn test_options_reach_the_mlp() {
        let options = BuildOptions {
            n_folds: 3,
            parallel: false,
        };
        let def = mlp(&ModelStore::new("unused"), options);
        assert!(!def.is_parallel());
        assert!(mlp(&ModelStore::new("unused"), BuildOptions::default()).is_parallel());
    }
}
