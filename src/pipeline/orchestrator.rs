//! Datasets x refactorings x models training loop

use super::format::format_results;
use super::log::{LogSink, TracingLog};
use super::report::{BatchReport, CombinationError, CombinationOutcome, CombinationSummary};
use super::timing::{Stopwatch, Timer};
use super::trainer::TrainingStrategy;
use crate::data::{Dataset, FeatureSet, FeatureSource, Refactoring};
use crate::error::{catch_panic, Error, Result};
use crate::model::ModelDefinition;

/// Seed handed to every training call unless overridden
pub const DEFAULT_SEED: u64 = 42;

/// Trains every model on every refactoring of every dataset
///
/// Features are retrieved once per (dataset, refactoring) pair. Each model is
/// then trained with the configured [`TrainingStrategy`], its results logged,
/// and the final model persisted through its definition. A failure or panic
/// in one combination is logged and recorded in the [`BatchReport`]; the
/// loop continues with the next model. Retrieval failures abort the run.
pub struct TrainingOrchestrator {
    models: Vec<Box<dyn ModelDefinition>>,
    refactorings: Vec<Refactoring>,
    datasets: Vec<Dataset>,
    strategy: TrainingStrategy,
    features: Box<dyn FeatureSource>,
    log: Box<dyn LogSink>,
    timer: Box<dyn Timer>,
    seed: u64,
}

impl TrainingOrchestrator {
    pub fn new(
        models: Vec<Box<dyn ModelDefinition>>,
        refactorings: Vec<Refactoring>,
        datasets: Vec<Dataset>,
        strategy: TrainingStrategy,
        features: Box<dyn FeatureSource>,
    ) -> Self {
        Self {
            models,
            refactorings,
            datasets,
            strategy,
            features,
            log: Box::new(TracingLog),
            timer: Box::new(Stopwatch::new()),
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_log(mut self, log: impl LogSink + 'static) -> Self {
        self.log = Box::new(log);
        self
    }

    pub fn with_timer(mut self, timer: impl Timer + 'static) -> Self {
        self.timer = Box::new(timer);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn strategy(&self) -> &TrainingStrategy {
        &self.strategy
    }

    /// Number of (dataset, refactoring, model) combinations a run visits
    pub fn n_combinations(&self) -> usize {
        self.datasets.len() * self.refactorings.len() * self.models.len()
    }

    pub fn run(&self) -> Result<BatchReport> {
        let mut report = BatchReport::new();
        if self.n_combinations() == 0 {
            tracing::info!("nothing to train");
            report.finish();
            return Ok(report);
        }

        for dataset in &self.datasets {
            self.log.log(&format!("Dataset {dataset}"));

            for refactoring in &self.refactorings {
                let refactoring_name = refactoring.name();
                self.log.log(&format!("**** Refactoring {refactoring_name}"));

                let features = self.features.retrieve(dataset, refactoring)?;
                tracing::info!(
                    %dataset,
                    refactoring = refactoring_name,
                    instances = features.n_samples(),
                    positives = features.n_positive(),
                    "features retrieved"
                );

                for def in &self.models {
                    let model_name = def.name().to_string();
                    let result = catch_panic(|| {
                        self.train_one(dataset, refactoring_name, def.as_ref(), &features)
                    })
                    .map_err(|e| self.report_failure(dataset, refactoring_name, &model_name, &e));

                    report.push(CombinationOutcome {
                        dataset: dataset.clone(),
                        refactoring: refactoring_name.to_string(),
                        model: model_name,
                        result,
                    });
                }
            }
        }

        report.finish();
        tracing::info!(%report, "batch finished");
        Ok(report)
    }

    fn train_one(
        &self,
        dataset: &Dataset,
        refactoring: &str,
        def: &dyn ModelDefinition,
        features: &FeatureSet,
    ) -> Result<CombinationSummary> {
        let model_name = def.name();
        self.log.log(&format!("Model {model_name}"));
        self.timer.start();

        let outcome = self
            .strategy
            .train(def, &features.x, &features.y, self.seed, self.log.as_ref())?;
        outcome.check_shape()?;

        self.log.log(&format_results(
            dataset,
            refactoring,
            model_name,
            &outcome,
            &features.features,
        ));

        def.persist(
            dataset,
            refactoring,
            &features.features,
            outcome.model.as_ref(),
            &features.scaler,
        )?;

        self.timer.finish(dataset, model_name, refactoring);
        Ok(CombinationSummary::from_outcome(&outcome))
    }

    fn report_failure(
        &self,
        dataset: &Dataset,
        refactoring: &str,
        model: &str,
        error: &Error,
    ) -> CombinationError {
        let failure = CombinationError::new(dataset, refactoring, model, error);
        let trace = failure.trace();
        tracing::error!(%dataset, refactoring, model, error = %error, "{trace}");

        self.log.log(&format!(
            "An error occurred while working on refactoring {refactoring} model {model}"
        ));
        self.log.log(&failure.message);
        self.log.log(&trace);
        failure
    }
}
