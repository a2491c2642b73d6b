//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, validate_config, validate_paths, TrainArgs};

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    let mut config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut config, &args);
    validate_config(&config).map_err(|e| format!("Invalid overrides: {e}"))?;
    validate_paths(&config).map_err(|e| format!("Config error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "✓ Config loaded: {} datasets x {} refactorings x {} models",
            config.datasets.len(),
            config.refactorings.len(),
            config.models.len()
        ),
    );

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - skipping training");
        return Ok(());
    }

    let orchestrator = config.orchestrator().map_err(|e| format!("Setup failed: {e}"))?;
    let report = orchestrator.run().map_err(|e| format!("Training aborted: {e}"))?;

    log(level, LogLevel::Normal, &format!("✓ Batch finished: {report}"));
    for failure in report.failures() {
        log(level, LogLevel::Verbose, &format!("  ✗ {failure}"));
    }

    if let Some(path) = &config.output.report {
        report
            .write_json(path)
            .map_err(|e| format!("Could not write report: {e}"))?;
        log(
            level,
            LogLevel::Normal,
            &format!("  Report written to {}", path.display()),
        );
    }
    Ok(())
}
