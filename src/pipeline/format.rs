//! Human-readable renderings of training results

use std::fmt::Write;

use crate::data::Dataset;
use crate::model::TrainedOutcome;
use crate::search::SearchOutcome;

/// Features listed by [`format_results`] when the model exposes weights
pub const TOP_FEATURES: usize = 10;

fn floats(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

fn counts(values: &[usize]) -> String {
    let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Per-fold scores, their means, and the heaviest features of the final model
pub fn format_results(
    dataset: &Dataset,
    refactoring: &str,
    model_name: &str,
    outcome: &TrainedOutcome,
    features: &[String],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "results for {dataset} / {refactoring} / {model_name}");
    let _ = writeln!(
        out,
        "Precision: {} (mean {:.4})",
        floats(&outcome.precision),
        outcome.mean_precision()
    );
    let _ = writeln!(
        out,
        "Recall: {} (mean {:.4})",
        floats(&outcome.recall),
        outcome.mean_recall()
    );
    let _ = writeln!(
        out,
        "Accuracy: {} (mean {:.4})",
        floats(&outcome.accuracy),
        outcome.mean_accuracy()
    );
    let _ = writeln!(out, "TN: {}", counts(&outcome.tn));
    let _ = writeln!(out, "FP: {}", counts(&outcome.fp));
    let _ = writeln!(out, "FN: {}", counts(&outcome.fn_));
    let _ = write!(out, "TP: {}", counts(&outcome.tp));

    if let Some(weights) = outcome.model.feature_weights() {
        let mut ranked: Vec<(&String, f64)> =
            features.iter().zip(weights.iter().copied()).collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        let top: Vec<String> = ranked
            .iter()
            .take(TOP_FEATURES)
            .map(|(name, w)| format!("{name}={w:.4}"))
            .collect();
        let _ = write!(out, "\nTop features: {}", top.join(", "));
    }
    out
}

/// Best configuration of a search and the mean score of every candidate
pub fn format_best_parameters(search: &SearchOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Best {} score: {:.4}", search.scoring, search.best_score);
    let _ = writeln!(out, "Best parameters: {}", search.best_params);
    let _ = write!(out, "All candidates:");
    for trial in &search.trials {
        if trial.is_completed() {
            let _ = write!(
                out,
                "\n  {:.4} (+/- {:.4}) for {}",
                trial.mean_score, trial.std_score, trial.config
            );
        } else {
            let _ = write!(out, "\n  failed for {}", trial.config);
        }
    }
    out
}
