//! Cross-validated hyperparameter search

use std::cmp::Ordering;

use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::SearchError;
use super::grid::GridSearch;
use super::randomized::RandomizedSearch;
use super::space::{HyperparameterSpace, ParamSet};
use super::trial::Trial;
use crate::error::{catch_panic, Error, Result};
use crate::eval::cross_validate::fit_and_score;
use crate::eval::{Scorer, StratifiedKFold};
use crate::model::Classifier;

/// How candidate configurations are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// `n_iter` random samples from the space
    Randomized { n_iter: usize },
    /// Every point of the grid; continuous ranges use `grid_points` values
    Grid { grid_points: usize },
}

/// Result of [`SearchCv::fit`]
#[derive(Debug)]
pub struct SearchOutcome {
    /// Best configuration by mean search score
    pub best_params: ParamSet,
    pub best_score: f64,
    /// Index of the best trial in `trials`
    pub best_index: usize,
    /// Every evaluated candidate, in generation order
    pub trials: Vec<Trial>,
    /// Best configuration refit on the full data
    pub best_estimator: Box<dyn Classifier>,
    pub scoring: Scorer,
}

impl SearchOutcome {
    pub fn n_failed(&self) -> usize {
        self.trials.iter().filter(|t| !t.is_completed()).count()
    }
}

/// Searches a space by scoring each candidate with stratified k-fold
#[derive(Debug, Clone)]
pub struct SearchCv {
    method: SearchMethod,
    n_splits: usize,
    scoring: Scorer,
    seed: u64,
    parallel: bool,
}

impl SearchCv {
    pub fn new(method: SearchMethod, n_splits: usize) -> Self {
        Self {
            method,
            n_splits,
            scoring: Scorer::Accuracy,
            seed: 42,
            parallel: true,
        }
    }

    /// Scorer used to rank candidates
    pub fn with_scoring(mut self, scoring: Scorer) -> Self {
        self.scoring = scoring;
        self
    }

    /// Seed for candidate sampling and fold shuffling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn method(&self) -> SearchMethod {
        self.method
    }

    /// Candidate configurations this search would evaluate
    pub fn candidates(&self, space: &HyperparameterSpace) -> Result<Vec<ParamSet>> {
        let configs = match self.method {
            SearchMethod::Randomized { n_iter } => RandomizedSearch::new(space.clone(), n_iter)
                .with_seed(self.seed)
                .configurations()?,
            SearchMethod::Grid { grid_points } => {
                GridSearch::new(space.clone(), grid_points).configurations()?
            }
        };
        Ok(configs)
    }

    /// Evaluate every candidate and refit the best one on `(x, y)`
    ///
    /// `build` turns a configuration into an untrained classifier. Candidates
    /// that fail or panic on any fold are kept as failed trials. When no
    /// candidate completes, the first candidate's error is returned as is.
    pub fn fit<F>(
        &self,
        build: F,
        space: &HyperparameterSpace,
        x: &Array2<f64>,
        y: &Array1<usize>,
    ) -> Result<SearchOutcome>
    where
        F: Fn(&ParamSet) -> Result<Box<dyn Classifier>> + Sync,
    {
        let candidates = self.candidates(space)?;
        let splits = StratifiedKFold::new(self.n_splits)
            .with_seed(self.seed)
            .split(&y.to_vec())?;

        // Every (candidate, fold) pair is an independent job.
        let jobs: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..splits.len()).map(move |f| (c, f)))
            .collect();
        let run = |&(c, f): &(usize, usize)| {
            let factory = || build(&candidates[c]);
            catch_panic(|| fit_and_score(&factory, x, y, &splits[f]))
                .map(|r| self.scoring.score(&r.confusion))
        };
        let results: Vec<Result<f64>> = if self.parallel {
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        let mut trials: Vec<Trial> = Vec::with_capacity(candidates.len());
        let mut first_error: Option<Error> = None;
        let mut results = results.into_iter();
        for (c, config) in candidates.iter().enumerate() {
            let mut trial = Trial::new(c, config.clone());
            let chunk: Vec<Result<f64>> = results.by_ref().take(splits.len()).collect();
            match chunk.into_iter().collect::<Result<Vec<f64>>>() {
                Ok(scores) => trial.complete(scores),
                Err(e) => {
                    tracing::warn!(
                        candidate = %trial.config,
                        error = %e,
                        "search candidate failed"
                    );
                    trial.fail(e.to_string());
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
            trials.push(trial);
        }

        // With every candidate failed, the first failure is the search's error.
        let Some(best_index) = self.best_trial(&trials) else {
            tracing::warn!(candidates = trials.len(), "every search candidate failed");
            return Err(first_error.unwrap_or_else(|| SearchError::NoCandidates.into()));
        };
        let best = &trials[best_index];

        let mut best_estimator = build(&best.config)?;
        best_estimator.fit(x.view(), y.view())?;

        Ok(SearchOutcome {
            best_params: best.config.clone(),
            best_score: best.mean_score,
            best_index,
            best_estimator,
            scoring: self.scoring,
            trials,
        })
    }

    /// First completed trial with the best mean score
    fn best_trial(&self, trials: &[Trial]) -> Option<usize> {
        let better = |a: f64, b: f64| -> bool {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if self.scoring.higher_is_better() {
                ord == Ordering::Greater
            } else {
                ord == Ordering::Less
            }
        };

        trials
            .iter()
            .filter(|t| t.is_completed())
            .fold(None, |best: Option<&Trial>, t| match best {
                Some(b) if !better(t.mean_score, b.mean_score) => Some(b),
                _ => Some(t),
            })
            .map(|t| t.id)
    }
}
