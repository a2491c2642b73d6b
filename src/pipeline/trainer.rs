//! Single-model training strategies

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::format::format_best_parameters;
use super::log::LogSink;
use crate::error::Result;
use crate::eval::{cross_validate, Scorer, StratifiedKFold};
use crate::model::{Classifier, ModelDefinition, TrainedOutcome};
use crate::search::{ParamSet, SearchCv, SearchMethod};

/// Candidate generation used by the hyperparameter search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    Randomized,
    Grid,
}

impl std::str::FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "randomized" | "random" => Ok(SearchKind::Randomized),
            "grid" => Ok(SearchKind::Grid),
            _ => Err(format!("Unknown search: {s}. Valid searches: randomized, grid")),
        }
    }
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchKind::Randomized => write!(f, "randomized"),
            SearchKind::Grid => write!(f, "grid"),
        }
    }
}

/// Knobs of the search-then-validate strategy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub search: SearchKind,
    /// Folds used to score each search candidate
    pub n_cv_search: usize,
    pub n_iter_random_search: usize,
    /// Folds of the evaluation that produces the reported scores
    pub n_cv: usize,
    /// Values per continuous parameter in grid mode
    pub grid_points: usize,
    pub scoring: Scorer,
    pub parallel: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            search: SearchKind::Randomized,
            n_cv_search: 5,
            n_iter_random_search: 100,
            n_cv: 10,
            grid_points: 5,
            scoring: Scorer::Accuracy,
            parallel: true,
        }
    }
}

impl SearchSettings {
    pub fn method(&self) -> SearchMethod {
        match self.search {
            SearchKind::Randomized => SearchMethod::Randomized {
                n_iter: self.n_iter_random_search,
            },
            SearchKind::Grid => SearchMethod::Grid {
                grid_points: self.grid_points,
            },
        }
    }
}

/// How a model definition is turned into a [`TrainedOutcome`]
#[derive(Clone, Debug, PartialEq)]
pub enum TrainingStrategy {
    /// Hyperparameter search, cross-validation of the winner, final full fit
    Search(SearchSettings),
    /// The definition trains itself through [`ModelDefinition::run`]
    Delegated,
}

impl TrainingStrategy {
    /// Train one model definition on `(x, y)`
    ///
    /// Every error is returned unchanged; containment is the caller's job.
    pub fn train(
        &self,
        def: &dyn ModelDefinition,
        x: &Array2<f64>,
        y: &Array1<usize>,
        seed: u64,
        log: &dyn LogSink,
    ) -> Result<TrainedOutcome> {
        match self {
            TrainingStrategy::Search(settings) => {
                search_then_validate(settings, def, x, y, seed, log)
            }
            TrainingStrategy::Delegated => def.run(x, y, seed),
        }
    }
}

fn search_then_validate(
    settings: &SearchSettings,
    def: &dyn ModelDefinition,
    x: &Array2<f64>,
    y: &Array1<usize>,
    seed: u64,
    log: &dyn LogSink,
) -> Result<TrainedOutcome> {
    let base: ParamSet = def.model()?.params();
    let space = def.params_to_tune()?;
    let build = |candidate: &ParamSet| -> Result<Box<dyn Classifier>> {
        def.model_with(&base.merged(candidate))
    };

    let search = SearchCv::new(settings.method(), settings.n_cv_search)
        .with_scoring(settings.scoring)
        .with_seed(seed)
        .with_parallel(settings.parallel);

    log.log(&format!("Search started at {}", now()));
    let outcome = search.fit(build, &space, x, y)?;
    log.log(&format_best_parameters(&outcome));
    let best = base.merged(&outcome.best_params);

    log.log(&format!("Cross validation started at {}", now()));
    let cv = StratifiedKFold::new(settings.n_cv).with_seed(seed);
    let scores = cross_validate(
        || def.model_with(&best),
        x,
        y,
        &cv,
        &Scorer::EVALUATION,
        settings.parallel,
    )?;

    let mut model = def.model_with(&best)?;
    model.fit(x.view(), y.view())?;

    TrainedOutcome::from_cv(&scores, model)
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_map_to_search_method() {
        let mut settings = SearchSettings {
            n_iter_random_search: 7,
            grid_points: 3,
            ..Default::default()
        };
        assert_eq!(settings.method(), SearchMethod::Randomized { n_iter: 7 });
        settings.search = SearchKind::Grid;
        assert_eq!(settings.method(), SearchMethod::Grid { grid_points: 3 });
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: SearchSettings =
            serde_yaml::from_str("search: grid\nn_cv: 3\n").expect("valid yaml");
        assert_eq!(settings.search, SearchKind::Grid);
        assert_eq!(settings.n_cv, 3);
        assert_eq!(settings.n_cv_search, 5);
        assert_eq!(settings.scoring, Scorer::Accuracy);
    }
}
