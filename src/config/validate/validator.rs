//! Configuration validation logic

use std::collections::BTreeSet;

use super::error::ValidationError;
use crate::config::schema::{ExperimentConfig, PipelineKind};
use crate::model::registry;
use crate::pipeline::SearchKind;

/// Validate an experiment configuration
///
/// Checks model names against the registry, fold counts, search sizes,
/// duplicates, and that every model fits the configured pipeline. Paths are
/// checked separately by [`validate_paths`].
pub fn validate_config(config: &ExperimentConfig) -> Result<(), ValidationError> {
    check_unique("dataset", config.datasets.iter().map(|d| d.as_str()))?;
    check_unique("refactoring", config.refactorings.iter().map(|r| r.name()))?;
    check_unique("model", config.models.iter().map(String::as_str))?;

    for name in &config.models {
        let entry = registry::lookup(name)
            .ok_or_else(|| ValidationError::UnknownModel(name.clone()))?;
        let pipeline = match config.pipeline {
            PipelineKind::Binary if entry.delegated => Some("binary"),
            PipelineKind::DeepLearning if !entry.delegated => Some("deep_learning"),
            _ => None,
        };
        if let Some(pipeline) = pipeline {
            return Err(ValidationError::PipelineMismatch {
                model: name.clone(),
                pipeline,
            });
        }
    }

    let training = &config.training;
    if training.n_cv < 2 {
        return Err(ValidationError::InvalidFolds {
            name: "n_cv",
            value: training.n_cv,
        });
    }
    if config.pipeline == PipelineKind::Binary {
        if training.n_cv_search < 2 {
            return Err(ValidationError::InvalidFolds {
                name: "n_cv_search",
                value: training.n_cv_search,
            });
        }
        match training.search {
            SearchKind::Randomized if training.n_iter_random_search == 0 => {
                return Err(ValidationError::InvalidIterations(training.n_iter_random_search));
            }
            SearchKind::Grid if training.grid_points < 2 => {
                return Err(ValidationError::InvalidGridPoints(training.grid_points));
            }
            _ => {}
        }
    }

    if config.features.label_column.trim().is_empty() {
        return Err(ValidationError::EmptyLabelColumn);
    }

    Ok(())
}

/// Check that the feature root exists on disk
pub fn validate_paths(config: &ExperimentConfig) -> Result<(), ValidationError> {
    if !config.features.root.is_dir() {
        return Err(ValidationError::FeatureRootNotFound(
            config.features.root.display().to_string(),
        ));
    }
    Ok(())
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName(kind));
        }
        if !seen.insert(name) {
            return Err(ValidationError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
