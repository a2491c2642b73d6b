//! JSON model artifacts on the local filesystem

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use crate::data::{Dataset, Scaler};
use crate::error::{Error, Result};
use crate::search::ParamSet;

/// Everything needed to reapply a trained model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub dataset: Dataset,
    pub refactoring: String,
    pub model_name: String,
    pub features: Vec<String>,
    pub params: ParamSet,
    pub model: serde_json::Value,
    pub scaler: Scaler,
    pub created_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(
        dataset: &Dataset,
        refactoring: &str,
        model_name: &str,
        features: &[String],
        model: &dyn Classifier,
        scaler: &Scaler,
    ) -> Result<Self> {
        Ok(Self {
            dataset: dataset.clone(),
            refactoring: refactoring.to_string(),
            model_name: model_name.to_string(),
            features: features.to_vec(),
            params: model.params(),
            model: model.export()?,
            scaler: scaler.clone(),
            created_at: Utc::now(),
        })
    }
}

/// Writes artifacts to `<root>/<dataset>/<refactoring>/<model>.json`
#[derive(Clone, Debug)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, dataset: &Dataset, refactoring: &str, model_name: &str) -> PathBuf {
        self.root
            .join(dataset.as_str())
            .join(refactoring)
            .join(format!("{model_name}.json"))
    }

    /// Write an artifact, replacing any previous one for the same combination
    pub fn save(&self, artifact: &ModelArtifact) -> Result<PathBuf> {
        let path = self.path_for(&artifact.dataset, &artifact.refactoring, &artifact.model_name);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        }
        let json = serde_json::to_string_pretty(artifact)?;
        fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
        tracing::debug!(path = %path.display(), "model artifact written");
        Ok(path)
    }

    pub fn load(
        &self,
        dataset: &Dataset,
        refactoring: &str,
        model_name: &str,
    ) -> Result<ModelArtifact> {
        let path = self.path_for(dataset, refactoring, model_name);
        let json = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}
