//! Per-fold scores plus the finally trained model

use super::classifier::Classifier;
use crate::error::{Error, Result};
use crate::eval::{CvScores, Scorer};

/// Result of training one model on one (dataset, refactoring) pair
///
/// Every score vector holds one entry per evaluation fold.
#[derive(Debug)]
pub struct TrainedOutcome {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub accuracy: Vec<f64>,
    pub tn: Vec<usize>,
    pub fp: Vec<usize>,
    pub fn_: Vec<usize>,
    pub tp: Vec<usize>,
    /// Model fit on all instances; this is what gets persisted
    pub model: Box<dyn Classifier>,
}

impl TrainedOutcome {
    /// Assemble an outcome from cross-validation scores
    pub fn from_cv(scores: &CvScores, model: Box<dyn Classifier>) -> Result<Self> {
        Ok(Self {
            precision: scores.get(Scorer::Precision)?.to_vec(),
            recall: scores.get(Scorer::Recall)?.to_vec(),
            accuracy: scores.get(Scorer::Accuracy)?.to_vec(),
            tn: scores.counts(|cm| cm.tn),
            fp: scores.counts(|cm| cm.fp),
            fn_: scores.counts(|cm| cm.fn_),
            tp: scores.counts(|cm| cm.tp),
            model,
        })
    }

    pub fn n_folds(&self) -> usize {
        self.precision.len()
    }

    /// All seven score vectors must have the same length
    pub fn check_shape(&self) -> Result<()> {
        let n = self.n_folds();
        let lengths = [
            self.recall.len(),
            self.accuracy.len(),
            self.tn.len(),
            self.fp.len(),
            self.fn_.len(),
            self.tp.len(),
        ];
        if n == 0 || lengths.iter().any(|&len| len != n) {
            return Err(Error::InvalidData(format!(
                "score vectors disagree in length: precision={n}, others={lengths:?}"
            )));
        }
        Ok(())
    }

    pub fn mean_precision(&self) -> f64 {
        mean(&self.precision)
    }

    pub fn mean_recall(&self) -> f64 {
        mean(&self.recall)
    }

    pub fn mean_accuracy(&self) -> f64 {
        mean(&self.accuracy)
    }
}

fn mean(values: &[f64]) -> f64 {
    crate::eval::cross_validate::mean(values)
}
