//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, validate_paths, ExperimentConfig, ValidateArgs};

/// One-paragraph description of what a configuration will do
pub fn format_experiment(config: &ExperimentConfig) -> String {
    let names = |items: Vec<String>| items.join(", ");
    let mut lines = vec![
        format!(
            "  Datasets ({}): {}",
            config.datasets.len(),
            names(config.datasets.iter().map(ToString::to_string).collect())
        ),
        format!(
            "  Refactorings ({}): {}",
            config.refactorings.len(),
            names(config.refactorings.iter().map(ToString::to_string).collect())
        ),
        format!("  Models ({}): {}", config.models.len(), config.models.join(", ")),
        format!("  Pipeline: {:?}", config.pipeline),
    ];
    let training = &config.training;
    lines.push(format!(
        "  Search: {} (n_cv_search={}, n_iter={}, grid_points={}, scoring={})",
        training.search,
        training.n_cv_search,
        training.n_iter_random_search,
        training.grid_points,
        training.scoring
    ));
    lines.push(format!("  Evaluation folds: {}", training.n_cv));
    lines.push(format!("  Seed: {}", training.seed));
    lines.push(format!("  Features: {}", config.features.root.display()));
    lines.push(format!("  Models dir: {}", config.output.models_dir.display()));
    lines.join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    let config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    validate_paths(&config).map_err(|e| format!("Config error: {e}"))?;

    log(level, LogLevel::Normal, "✓ Configuration is valid");
    if args.detailed {
        log(level, LogLevel::Normal, &format_experiment(&config));
    }
    Ok(())
}
