//! YAML schema of an experiment

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::data::{CsvFeatureStore, Dataset, Refactoring, Scaling};
use crate::error::Result;
use crate::eval::Scorer;
use crate::model::{registry, ModelStore};
use crate::pipeline::{FileLog, SearchKind, SearchSettings, TrainingOrchestrator, TrainingStrategy};

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Which single-model trainer the pipeline uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    /// Hyperparameter search, cross-validation, final fit
    #[default]
    Binary,
    /// Models train themselves end to end
    DeepLearning,
}

/// Complete experiment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Datasets, in processing order
    pub datasets: Vec<Dataset>,

    /// Refactorings, in processing order
    pub refactorings: Vec<Refactoring>,

    /// Registered model names, in processing order
    pub models: Vec<String>,

    #[serde(default)]
    pub pipeline: PipelineKind,

    #[serde(default)]
    pub training: TrainingParams,

    pub features: FeatureConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Search and evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// "randomized" | "grid"
    pub search: SearchKind,

    /// Folds inside the hyperparameter search
    pub n_cv_search: usize,

    /// Candidates drawn by the randomized search
    pub n_iter_random_search: usize,

    /// Folds of the evaluation step
    pub n_cv: usize,

    /// Values per continuous parameter in grid search
    pub grid_points: usize,

    /// Seed handed to every training call
    pub seed: u64,

    /// Scorer used to rank search candidates
    pub scoring: Scorer,

    /// Evaluate folds and candidates on all cores
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub parallel: bool,
}

impl Default for TrainingParams {
    fn default() -> Self {
        let search = SearchSettings::default();
        Self {
            search: search.search,
            n_cv_search: search.n_cv_search,
            n_iter_random_search: search.n_iter_random_search,
            n_cv: search.n_cv,
            grid_points: search.grid_points,
            seed: crate::pipeline::DEFAULT_SEED,
            scoring: search.scoring,
            parallel: search.parallel,
        }
    }
}

impl TrainingParams {
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            search: self.search,
            n_cv_search: self.n_cv_search,
            n_iter_random_search: self.n_iter_random_search,
            n_cv: self.n_cv,
            grid_points: self.grid_points,
            scoring: self.scoring,
            parallel: self.parallel,
        }
    }
}

/// Where labelled instances come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Directory holding `<dataset>/<refactoring>.csv`
    pub root: PathBuf,

    #[serde(default = "default_label_column")]
    pub label_column: String,

    #[serde(default)]
    pub scaling: Scaling,

    /// Undersample the majority class
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub balance: bool,
}

fn default_label_column() -> String {
    "prediction".to_string()
}

/// Where results go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root of the persisted model artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Results log file; results go to `tracing` only when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// JSON batch report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            log_file: None,
            report: None,
        }
    }
}

impl ExperimentConfig {
    pub fn strategy(&self) -> TrainingStrategy {
        match self.pipeline {
            PipelineKind::Binary => TrainingStrategy::Search(self.training.search_settings()),
            PipelineKind::DeepLearning => TrainingStrategy::Delegated,
        }
    }

    pub fn feature_store(&self) -> CsvFeatureStore {
        CsvFeatureStore::new(&self.features.root)
            .with_label_column(self.features.label_column.clone())
            .with_scaling(self.features.scaling)
            .with_balance(self.features.balance)
            .with_seed(self.training.seed)
    }

    pub fn model_store(&self) -> ModelStore {
        ModelStore::new(&self.output.models_dir)
    }

    /// Wire the configured models, feature store and results log together
    pub fn orchestrator(&self) -> Result<TrainingOrchestrator> {
        let options = registry::BuildOptions {
            n_folds: self.training.n_cv,
            parallel: self.training.parallel,
        };
        let models = registry::build_all(&self.models, &self.model_store(), options)?;
        let mut orchestrator = TrainingOrchestrator::new(
            models,
            self.refactorings.clone(),
            self.datasets.clone(),
            self.strategy(),
            Box::new(self.feature_store()),
        )
        .with_seed(self.training.seed);
        if let Some(path) = &self.output.log_file {
            orchestrator = orchestrator.with_log(FileLog::open(path)?);
        }
        Ok(orchestrator)
    }
}
