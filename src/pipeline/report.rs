//! Per-combination outcomes of a batch

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::model::TrainedOutcome;

/// Condensed scores of a successful combination
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CombinationSummary {
    pub n_folds: usize,
    pub mean_precision: f64,
    pub mean_recall: f64,
    pub mean_accuracy: f64,
    /// Confusion counts summed over folds
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl CombinationSummary {
    pub fn from_outcome(outcome: &TrainedOutcome) -> Self {
        Self {
            n_folds: outcome.n_folds(),
            mean_precision: outcome.mean_precision(),
            mean_recall: outcome.mean_recall(),
            mean_accuracy: outcome.mean_accuracy(),
            tp: outcome.tp.iter().sum(),
            tn: outcome.tn.iter().sum(),
            fp: outcome.fp.iter().sum(),
            fn_: outcome.fn_.iter().sum(),
        }
    }
}

/// Why one (dataset, refactoring, model) combination failed
#[derive(Debug, Serialize)]
pub struct CombinationError {
    pub dataset: Dataset,
    pub refactoring: String,
    pub model: String,
    pub message: String,
    /// Messages of the error's source chain, outermost first
    pub chain: Vec<String>,
    /// Stack where the error was raised, when the error records one
    pub backtrace: Option<String>,
}

impl CombinationError {
    pub fn new(dataset: &Dataset, refactoring: &str, model: &str, error: &Error) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            dataset: dataset.clone(),
            refactoring: refactoring.to_string(),
            model: model.to_string(),
            message: error.to_string(),
            chain,
            backtrace: error
                .origin()
                .filter(|origin| origin.is_captured())
                .map(ToString::to_string),
        }
    }

    /// Multi-line rendering with causes and, when recorded, the backtrace
    pub fn trace(&self) -> String {
        let mut lines = vec![self.message.clone()];
        lines.extend(self.chain.iter().map(|c| format!("caused by: {c}")));
        lines.extend(self.backtrace.iter().cloned());
        lines.join("\n")
    }
}

impl fmt::Display for CombinationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}: {}",
            self.dataset, self.refactoring, self.model, self.message
        )
    }
}

/// Outcome of one combination
#[derive(Debug, Serialize)]
pub struct CombinationOutcome {
    pub dataset: Dataset,
    pub refactoring: String,
    pub model: String,
    pub result: std::result::Result<CombinationSummary, CombinationError>,
}

impl CombinationOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything a batch run produced, in iteration order
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub combinations: Vec<CombinationOutcome>,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            combinations: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: CombinationOutcome) {
        self.combinations.push(outcome);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &CombinationOutcome> {
        self.combinations.iter().filter(|c| c.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CombinationError> {
        self.combinations.iter().filter_map(|c| c.result.as_ref().err())
    }

    pub fn n_failed(&self) -> usize {
        self.failures().count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON, creating parent directories
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| Error::io(path, e))
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} combinations, {} succeeded, {} failed",
            self.len(),
            self.len() - self.n_failed(),
            self.n_failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    fn io_error() -> Error {
        Error::io(
            "models/apache",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        )
    }

    #[test]
    fn test_error_chain_is_collected() {
        let err =
            CombinationError::new(&Dataset::new("apache"), "extract_method", "mlp", &io_error());
        assert!(err.message.contains("models/apache"));
        assert_eq!(err.chain, vec!["read-only".to_string()]);
        assert!(err.trace().contains("caused by: read-only"));
        let backtrace = err.backtrace.as_deref().expect("I/O errors record their origin");
        assert!(backtrace.contains("io_error"), "{backtrace}");
        assert!(!backtrace.contains("CombinationError"), "{backtrace}");

        let plain = CombinationError::new(
            &Dataset::new("apache"),
            "extract_method",
            "mlp",
            &Error::InvalidData("ragged rows".into()),
        );
        assert!(plain.backtrace.is_none());
        assert_eq!(plain.trace(), "Invalid data: ragged rows");
        assert_eq!(
            err.to_string(),
            format!("apache / extract_method / mlp: {}", err.message)
        );
    }

    #[test]
    fn test_report_counts_and_json() {
        let dataset = Dataset::new("apache");
        let mut report = BatchReport::new();
        report.push(CombinationOutcome {
            dataset: dataset.clone(),
            refactoring: "extract_method".into(),
            model: "gaussian_nb".into(),
            result: Ok(CombinationSummary {
                n_folds: 2,
                mean_precision: 1.0,
                mean_recall: 0.5,
                mean_accuracy: 0.75,
                tp: 2,
                tn: 3,
                fp: 0,
                fn_: 2,
            }),
        });
        report.push(CombinationOutcome {
            dataset: dataset.clone(),
            refactoring: "extract_method".into(),
            model: "mlp".into(),
            result: Err(CombinationError::new(&dataset, "extract_method", "mlp", &io_error())),
        });
        report.finish();

        assert_eq!(report.len(), 2);
        assert_eq!(report.n_failed(), 1);
        assert_eq!(report.succeeded().count(), 1);
        assert_eq!(report.to_string(), "2 combinations, 1 succeeded, 1 failed");

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("serialize")).expect("valid json");
        assert_eq!(json["combinations"][0]["result"]["Ok"]["fn"], 2);
        assert_eq!(json["combinations"][1]["result"]["Err"]["model"], "mlp");
        assert!(json["combinations"][1]["result"]["Err"]["backtrace"].is_string());
    }
}
