//! Per-fold scoring functions

use std::fmt;

use serde::{Deserialize, Serialize};

use super::confusion::BinaryConfusion;

/// Scorer computed from a fold's confusion counts
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    #[default]
    Accuracy,
    Precision,
    Recall,
    F1,
    #[serde(rename = "tp")]
    TruePositives,
    #[serde(rename = "tn")]
    TrueNegatives,
    #[serde(rename = "fp")]
    FalsePositives,
    #[serde(rename = "fn")]
    FalseNegatives,
}

impl Scorer {
    /// Scorers reported by the evaluation step
    pub const EVALUATION: [Scorer; 7] = [
        Scorer::Precision,
        Scorer::Recall,
        Scorer::Accuracy,
        Scorer::TrueNegatives,
        Scorer::FalsePositives,
        Scorer::FalseNegatives,
        Scorer::TruePositives,
    ];

    pub fn score(&self, cm: &BinaryConfusion) -> f64 {
        match self {
            Scorer::Accuracy => cm.accuracy(),
            Scorer::Precision => cm.precision(),
            Scorer::Recall => cm.recall(),
            Scorer::F1 => cm.f1(),
            Scorer::TruePositives => cm.tp as f64,
            Scorer::TrueNegatives => cm.tn as f64,
            Scorer::FalsePositives => cm.fp as f64,
            Scorer::FalseNegatives => cm.fn_ as f64,
        }
    }

    /// Whether higher values are better for this scorer
    pub fn higher_is_better(&self) -> bool {
        !matches!(self, Scorer::FalsePositives | Scorer::FalseNegatives)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scorer::Accuracy => "accuracy",
            Scorer::Precision => "precision",
            Scorer::Recall => "recall",
            Scorer::F1 => "f1",
            Scorer::TruePositives => "tp",
            Scorer::TrueNegatives => "tn",
            Scorer::FalsePositives => "fp",
            Scorer::FalseNegatives => "fn",
        }
    }
}

impl fmt::Display for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
