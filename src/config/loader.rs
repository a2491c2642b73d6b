//! Loading experiment configurations from YAML

use std::fs;
use std::path::Path;

use crate::config::schema::ExperimentConfig;
use crate::config::validate::validate_config;
use crate::error::{Error, Result};

/// Parse and validate a configuration from YAML text
pub fn parse_config(yaml: &str) -> Result<ExperimentConfig> {
    let config: ExperimentConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load, parse and validate a configuration file
///
/// Paths inside the configuration are not checked here; see
/// [`validate_paths`](crate::config::validate_paths).
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<ExperimentConfig> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;
    let config = parse_config(&yaml_content)?;
    tracing::debug!(
        path = %config_path.as_ref().display(),
        datasets = config.datasets.len(),
        refactorings = config.refactorings.len(),
        models = config.models.len(),
        "configuration loaded"
    );
    Ok(config)
}
