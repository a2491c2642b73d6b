//! Binary confusion matrix

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label treated as the positive class
pub const POSITIVE: usize = 1;

/// Confusion counts for a binary classifier (positive label = 1)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfusion {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl BinaryConfusion {
    /// Count outcomes from predictions and ground truth
    ///
    /// Every label other than [`POSITIVE`] counts as negative.
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize]) -> Self {
        debug_assert_eq!(y_pred.len(), y_true.len());

        y_pred
            .iter()
            .zip(y_true)
            .fold(Self::default(), |mut cm, (&pred, &truth)| {
                match (truth == POSITIVE, pred == POSITIVE) {
                    (true, true) => cm.tp += 1,
                    (false, false) => cm.tn += 1,
                    (false, true) => cm.fp += 1,
                    (true, false) => cm.fn_ += 1,
                }
                cm
            })
    }

    /// Total number of samples
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Fraction of correct predictions (0 when empty)
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// tp / (tp + fp), 0 when nothing was predicted positive
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// tp / (tp + fn), 0 when there are no positives
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for BinaryConfusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "            Pred 0 Pred 1")?;
        writeln!(f, "True 0 {:>11} {:>6}", self.tn, self.fp)?;
        writeln!(f, "True 1 {:>11} {:>6}", self.fn_, self.tp)
    }
}
