//! Trial types for hyperparameter search

use serde::{Deserialize, Serialize};

use super::space::ParamSet;

/// A single candidate evaluation (configuration + cross-validated score)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trial {
    /// Candidate index in generation order
    pub id: usize,
    /// Parameter configuration
    pub config: ParamSet,
    /// Score of every search fold
    pub fold_scores: Vec<f64>,
    /// Mean across folds (NaN until completed)
    pub mean_score: f64,
    /// Population standard deviation across folds
    pub std_score: f64,
    /// Trial status
    pub status: TrialStatus,
    /// Failure message, for failed trials
    pub error: Option<String>,
}

impl Trial {
    /// Create a new trial
    pub fn new(id: usize, config: ParamSet) -> Self {
        Self {
            id,
            config,
            fold_scores: Vec::new(),
            mean_score: f64::NAN,
            std_score: f64::NAN,
            status: TrialStatus::Pending,
            error: None,
        }
    }

    /// Mark trial as complete with its fold scores
    pub fn complete(&mut self, fold_scores: Vec<f64>) {
        let n = fold_scores.len().max(1) as f64;
        let mean = fold_scores.iter().sum::<f64>() / n;
        let variance = fold_scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

        self.mean_score = mean;
        self.std_score = variance.sqrt();
        self.fold_scores = fold_scores;
        self.status = TrialStatus::Completed;
    }

    /// Mark trial as failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.status = TrialStatus::Failed;
    }

    pub fn is_completed(&self) -> bool {
        self.status == TrialStatus::Completed
    }
}

/// Trial status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialStatus {
    Pending,
    Completed,
    Failed,
}
