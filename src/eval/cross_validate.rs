//! K-fold cross-validation of a classifier factory

use std::collections::BTreeMap;
use std::time::Instant;

use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;

use super::confusion::BinaryConfusion;
use super::kfold::{Fold, StratifiedKFold};
use super::scorer::Scorer;
use crate::error::{catch_panic, Error, Result};
use crate::model::Classifier;

/// Outcome of a single fold
#[derive(Clone, Debug)]
pub struct FoldResult {
    pub confusion: BinaryConfusion,
    pub fit_time_ms: f64,
}

/// Per-fold scores from [`cross_validate`]
#[derive(Clone, Debug)]
pub struct CvScores {
    /// Fold results in split order
    pub folds: Vec<FoldResult>,
    /// scorer -> one value per fold
    pub scores: BTreeMap<Scorer, Vec<f64>>,
}

impl CvScores {
    fn from_folds(folds: Vec<FoldResult>, scorers: &[Scorer]) -> Self {
        let scores = scorers
            .iter()
            .map(|s| (*s, folds.iter().map(|f| s.score(&f.confusion)).collect()))
            .collect();
        Self { folds, scores }
    }

    /// Per-fold values for a scorer that was requested
    pub fn get(&self, scorer: Scorer) -> Result<&[f64]> {
        self.scores
            .get(&scorer)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::InvalidParameter(format!("scorer '{scorer}' was not requested")))
    }

    /// Mean of a scorer across folds
    pub fn mean(&self, scorer: Scorer) -> Result<f64> {
        let values = self.get(scorer)?;
        Ok(mean(values))
    }

    /// Per-fold values of a confusion count
    pub fn counts(&self, pick: impl Fn(&BinaryConfusion) -> usize) -> Vec<usize> {
        self.folds.iter().map(|f| pick(&f.confusion)).collect()
    }

    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Fit a fresh model on one fold's train rows and score its test rows
pub(crate) fn fit_and_score<F>(
    factory: &F,
    x: &Array2<f64>,
    y: &Array1<usize>,
    fold: &Fold,
) -> Result<FoldResult>
where
    F: Fn() -> Result<Box<dyn Classifier>> + Sync,
{
    let (train, test) = fold;
    let start = Instant::now();

    let mut model = factory()?;
    let x_train = x.select(Axis(0), train);
    let y_train = y.select(Axis(0), train);
    model.fit(x_train.view(), y_train.view())?;
    let fit_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let x_test = x.select(Axis(0), test);
    let predicted = model.predict(x_test.view())?.to_vec();
    let truth: Vec<usize> = test.iter().map(|&i| y[i]).collect();

    Ok(FoldResult {
        confusion: BinaryConfusion::from_predictions(&predicted, &truth),
        fit_time_ms,
    })
}

/// Evaluate models built by `factory` with stratified k-fold cross-validation
///
/// Each fold fits its own instance. With `parallel` set, folds run on the
/// rayon pool; results are always returned in split order. A panicking fold
/// becomes [`Error::Panicked`].
pub fn cross_validate<F>(
    factory: F,
    x: &Array2<f64>,
    y: &Array1<usize>,
    cv: &StratifiedKFold,
    scorers: &[Scorer],
    parallel: bool,
) -> Result<CvScores>
where
    F: Fn() -> Result<Box<dyn Classifier>> + Sync,
{
    if x.nrows() != y.len() {
        return Err(Error::InvalidData(format!(
            "x has {} rows but y has {} labels",
            x.nrows(),
            y.len()
        )));
    }

    let labels = y.to_vec();
    let splits = cv.split(&labels)?;

    let folds: Vec<FoldResult> = if parallel {
        splits
            .par_iter()
            .map(|fold| catch_panic(|| fit_and_score(&factory, x, y, fold)))
            .collect::<Result<_>>()?
    } else {
        splits
            .iter()
            .map(|fold| catch_panic(|| fit_and_score(&factory, x, y, fold)))
            .collect::<Result<_>>()?
    };

    Ok(CvScores::from_folds(folds, scorers))
}
