//! Orchestrator behaviour against stub collaborators

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::*;
use crate::data::{Dataset, FeatureSet, FeatureSource, Refactoring, RefactoringLevel, Scaler};
use crate::error::{Error, Result};
use crate::model::{check_predict_input, Classifier, ModelDefinition, TrainedOutcome};
use crate::search::{HyperparameterSpace, ParamSet, ParameterDomain};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Behaviour {
    Ok,
    FailFit,
    Panic,
    FailPersist,
}

/// Predicts 1 when the first feature is above its training mean plus `shift`
#[derive(Clone, Debug)]
struct Threshold {
    behaviour: Behaviour,
    shift: f64,
    threshold: Option<f64>,
}

impl Classifier for Threshold {
    fn name(&self) -> &str {
        "threshold"
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, _y: ArrayView1<'_, usize>) -> Result<()> {
        match self.behaviour {
            Behaviour::FailFit => return Err(Error::fit("threshold", "refuses to fit")),
            Behaviour::Panic => panic!("model blew up"),
            Behaviour::Ok | Behaviour::FailPersist => {}
        }
        let mean = x.column(0).mean().unwrap_or(0.0);
        self.threshold = Some(mean + self.shift);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<usize>> {
        check_predict_input("threshold", &x, self.threshold.map(|_| x.ncols()))?;
        let t = self.threshold.unwrap_or_default();
        Ok(x.column(0).mapv(|v| usize::from(v >= t)))
    }

    fn params(&self) -> ParamSet {
        ParamSet::new().with("shift", self.shift)
    }

    fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "threshold": self.threshold }))
    }
}

#[derive(Default)]
struct Calls {
    model: AtomicUsize,
    model_with: AtomicUsize,
    params_to_tune: AtomicUsize,
    run: AtomicUsize,
    seeds: Mutex<Vec<u64>>,
    persisted: Mutex<Vec<(String, String, String)>>,
}

impl Calls {
    fn persisted(&self) -> Vec<(String, String, String)> {
        self.persisted.lock().expect("lock").clone()
    }
}

struct StubDef {
    name: &'static str,
    behaviour: Behaviour,
    /// None makes this a delegated-only definition
    space: Option<HyperparameterSpace>,
    delegated_folds: usize,
    calls: Arc<Calls>,
}

impl StubDef {
    fn searched(
        name: &'static str,
        behaviour: Behaviour,
        calls: &Arc<Calls>,
    ) -> Box<dyn ModelDefinition> {
        Box::new(Self {
            name,
            behaviour,
            space: Some(HyperparameterSpace::new().with(
                "shift",
                ParameterDomain::Continuous {
                    low: -0.05,
                    high: 0.05,
                    log_scale: false,
                },
            )),
            delegated_folds: 0,
            calls: Arc::clone(calls),
        })
    }

    fn with_space(
        name: &'static str,
        space: HyperparameterSpace,
        calls: &Arc<Calls>,
    ) -> Box<dyn ModelDefinition> {
        Box::new(Self {
            name,
            behaviour: Behaviour::Ok,
            space: Some(space),
            delegated_folds: 0,
            calls: Arc::clone(calls),
        })
    }

    fn delegated(
        name: &'static str,
        behaviour: Behaviour,
        folds: usize,
        calls: &Arc<Calls>,
    ) -> Box<dyn ModelDefinition> {
        Box::new(Self {
            name,
            behaviour,
            space: None,
            delegated_folds: folds,
            calls: Arc::clone(calls),
        })
    }

    fn instance(&self, shift: f64) -> Box<dyn Classifier> {
        Box::new(Threshold {
            behaviour: self.behaviour,
            shift,
            threshold: None,
        })
    }
}

impl ModelDefinition for StubDef {
    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> Result<Box<dyn Classifier>> {
        self.calls.model.fetch_add(1, Ordering::SeqCst);
        if self.space.is_none() {
            return Err(Error::unsupported(self.name, "model"));
        }
        Ok(self.instance(0.0))
    }

    fn model_with(&self, params: &ParamSet) -> Result<Box<dyn Classifier>> {
        self.calls.model_with.fetch_add(1, Ordering::SeqCst);
        if self.space.is_none() {
            return Err(Error::unsupported(self.name, "model_with"));
        }
        Ok(self.instance(params.float_or("shift", 0.0)?))
    }

    fn params_to_tune(&self) -> Result<HyperparameterSpace> {
        self.calls.params_to_tune.fetch_add(1, Ordering::SeqCst);
        self.space
            .clone()
            .ok_or_else(|| Error::unsupported(self.name, "params_to_tune"))
    }

    fn run(&self, x: &Array2<f64>, y: &Array1<usize>, seed: u64) -> Result<TrainedOutcome> {
        self.calls.run.fetch_add(1, Ordering::SeqCst);
        self.calls.seeds.lock().expect("lock").push(seed);
        let mut model = self.instance(0.0);
        model.fit(x.view(), y.view())?;
        let n = self.delegated_folds;
        Ok(TrainedOutcome {
            precision: vec![1.0; n],
            recall: vec![1.0; n],
            accuracy: vec![1.0; n],
            tn: vec![1; n],
            fp: vec![0; n],
            fn_: vec![0; n],
            tp: vec![1; n],
            model,
        })
    }

    fn persist(
        &self,
        dataset: &Dataset,
        refactoring: &str,
        features: &[String],
        _model: &dyn Classifier,
        _scaler: &Scaler,
    ) -> Result<()> {
        assert_eq!(features, ["size", "index"]);
        if self.behaviour == Behaviour::FailPersist {
            return Err(Error::io(
                "models",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ));
        }
        self.calls.persisted.lock().expect("lock").push((
            dataset.to_string(),
            refactoring.to_string(),
            self.name.to_string(),
        ));
        Ok(())
    }
}

/// 20 instances; the first feature separates the classes
fn feature_set() -> FeatureSet {
    let y: Array1<usize> = (0..20).map(|i| i % 2).collect();
    let x = Array2::from_shape_fn((20, 2), |(i, j)| {
        if j == 0 {
            y[i] as f64 + 0.01 * i as f64
        } else {
            i as f64
        }
    });
    FeatureSet::new(
        vec!["size".to_string(), "index".to_string()],
        x,
        y,
        Scaler::Identity,
    )
    .expect("consistent feature set")
}

#[derive(Clone, Default)]
struct StubSource {
    retrieved: Arc<Mutex<Vec<(String, String)>>>,
    fail_on: Option<&'static str>,
}

impl StubSource {
    fn retrieved(&self) -> Vec<(String, String)> {
        self.retrieved.lock().expect("lock").clone()
    }
}

impl FeatureSource for StubSource {
    fn retrieve(&self, dataset: &Dataset, refactoring: &Refactoring) -> Result<FeatureSet> {
        self.retrieved
            .lock()
            .expect("lock")
            .push((dataset.to_string(), refactoring.name().to_string()));
        if self.fail_on == Some(dataset.as_str()) {
            return Err(Error::InvalidData(format!("no features for {dataset}")));
        }
        Ok(feature_set())
    }
}

#[derive(Clone, Default)]
struct RecordingTimer {
    events: Arc<Mutex<Vec<String>>>,
}

impl Timer for RecordingTimer {
    fn start(&self) {
        self.events.lock().expect("lock").push("start".to_string());
    }

    fn finish(&self, dataset: &Dataset, model: &str, refactoring: &str) {
        self.events
            .lock()
            .expect("lock")
            .push(format!("finish {dataset} {model} {refactoring}"));
    }
}

fn settings() -> SearchSettings {
    SearchSettings {
        search: SearchKind::Randomized,
        n_cv_search: 2,
        n_iter_random_search: 5,
        n_cv: 4,
        grid_points: 3,
        ..Default::default()
    }
}

fn refactorings(names: &[&str]) -> Vec<Refactoring> {
    names
        .iter()
        .map(|n| Refactoring::new(*n, RefactoringLevel::Method))
        .collect()
}

fn datasets(names: &[&str]) -> Vec<Dataset> {
    names.iter().map(|n| Dataset::new(*n)).collect()
}

/// Lines listed under "All candidates:" in the best-parameters entry
fn candidate_lines(log: &MemoryLog) -> usize {
    let entries = log.entries();
    let entry = entries
        .iter()
        .find(|e| e.starts_with("Best accuracy score"))
        .expect("best parameters logged");
    entry.lines().skip_while(|l| *l != "All candidates:").skip(1).count()
}

#[test]
fn test_empty_collections_do_nothing() {
    let cases: [(&[&str], &[&str], bool); 3] = [
        (&[], &["extract_method"], true),
        (&["d1"], &[], true),
        (&["d1"], &["extract_method"], false),
    ];
    for (ds, rs, with_model) in cases {
        let calls = Arc::new(Calls::default());
        let source = StubSource::default();
        let models = if with_model {
            vec![StubDef::searched("m", Behaviour::Ok, &calls)]
        } else {
            Vec::new()
        };
        let orchestrator = TrainingOrchestrator::new(
            models,
            refactorings(rs),
            datasets(ds),
            TrainingStrategy::Search(settings()),
            Box::new(source.clone()),
        );

        let report = orchestrator.run().expect("empty run should succeed");
        assert!(report.is_empty());
        assert!(source.retrieved().is_empty());
        assert!(calls.persisted().is_empty());
    }
}

#[test]
fn test_failing_model_does_not_stop_the_batch() {
    let calls = Arc::new(Calls::default());
    let log = MemoryLog::new();
    let orchestrator = TrainingOrchestrator::new(
        vec![
            StubDef::searched("m_ok", Behaviour::Ok, &calls),
            StubDef::searched("m_fail", Behaviour::FailFit, &calls),
        ],
        refactorings(&["extract_method"]),
        datasets(&["d1"]),
        TrainingStrategy::Search(settings()),
        Box::new(StubSource::default()),
    )
    .with_log(log.clone());

    let report = orchestrator.run().expect("run should return normally");

    assert_eq!(log.count_matching(&["results for", "m_ok"]), 1);
    assert_eq!(log.count_matching(&["results for", "m_fail"]), 0);
    assert_eq!(
        calls.persisted(),
        vec![("d1".to_string(), "extract_method".to_string(), "m_ok".to_string())]
    );
    assert_eq!(log.count_matching(&["An error occurred", "extract_method", "m_fail"]), 1);
    assert_eq!(log.count_matching(&["An error occurred"]), 1);

    assert_eq!(report.len(), 2);
    assert_eq!(report.n_failed(), 1);
    let failure = report.failures().next().expect("one failure");
    assert_eq!(failure.model, "m_fail");
    assert_eq!(failure.refactoring, "extract_method");
}

#[test]
fn test_one_error_entry_per_failing_model() {
    let calls = Arc::new(Calls::default());
    let log = MemoryLog::new();
    let orchestrator = TrainingOrchestrator::new(
        vec![
            StubDef::searched("first", Behaviour::Ok, &calls),
            StubDef::searched("broken_fit", Behaviour::FailFit, &calls),
            StubDef::searched("broken_persist", Behaviour::FailPersist, &calls),
            StubDef::searched("last", Behaviour::Ok, &calls),
        ],
        refactorings(&["extract_method"]),
        datasets(&["d1"]),
        TrainingStrategy::Search(settings()),
        Box::new(StubSource::default()),
    )
    .with_log(log.clone());

    let report = orchestrator.run().expect("run should succeed");

    let persisted: Vec<String> = calls.persisted().into_iter().map(|(_, _, m)| m).collect();
    assert_eq!(persisted, vec!["first", "last"]);
    assert_eq!(log.count_matching(&["An error occurred", "broken_fit"]), 1);
    assert_eq!(log.count_matching(&["An error occurred", "broken_persist"]), 1);
    assert_eq!(log.count_matching(&["An error occurred"]), 2);
    assert_eq!(report.n_failed(), 2);

    let persist_failure = report
        .failures()
        .find(|f| f.model == "broken_persist")
        .expect("persist failure recorded");
    assert_eq!(persist_failure.chain, vec!["read-only".to_string()]);
}

#[test]
fn test_panic_in_model_is_contained() {
    let calls = Arc::new(Calls::default());
    let log = MemoryLog::new();
    let strategy = TrainingStrategy::Search(SearchSettings {
        parallel: false,
        ..settings()
    });
    let orchestrator = TrainingOrchestrator::new(
        vec![
            StubDef::searched("panicky", Behaviour::Panic, &calls),
            StubDef::searched("steady", Behaviour::Ok, &calls),
        ],
        refactorings(&["extract_method"]),
        datasets(&["d1"]),
        strategy,
        Box::new(StubSource::default()),
    )
    .with_log(log.clone());

    let report = orchestrator.run().expect("panic must not escape run");

    let failure = report.failures().next().expect("panic recorded");
    assert_eq!(failure.model, "panicky");
    assert!(failure.message.contains("model blew up"), "{}", failure.message);
    assert_eq!(log.count_matching(&["An error occurred", "panicky"]), 1);
    assert_eq!(calls.persisted().len(), 1);
}

#[test]
fn test_failure_keeps_original_error_and_its_stack() {
    let calls = Arc::new(Calls::default());
    let log = MemoryLog::new();
    let orchestrator = TrainingOrchestrator::new(
        vec![
            StubDef::searched("m_fail", Behaviour::FailFit, &calls),
            StubDef::searched("panicky", Behaviour::Panic, &calls),
        ],
        refactorings(&["extract_method"]),
        datasets(&["d1"]),
        TrainingStrategy::Search(settings()),
        Box::new(StubSource::default()),
    )
    .with_log(log.clone());

    let report = orchestrator.run().expect("run should return normally");
    let failures: Vec<&CombinationError> = report.failures().collect();
    assert_eq!(failures.len(), 2);

    assert_eq!(failures[0].message, "Model 'threshold' failed to fit: refuses to fit");
    assert_eq!(failures[1].message, "Panicked: model blew up");
    for failure in failures {
        let backtrace = failure.backtrace.as_deref().expect("origin recorded");
        assert!(backtrace.contains("Threshold"), "{backtrace}");
        assert!(!backtrace.contains("report_failure"), "{backtrace}");
    }
    assert_eq!(log.count_matching(&["refuses to fit", "Threshold"]), 1);
}

#[test]
fn test_features_retrieved_once_per_pair_in_order() {
    let calls = Arc::new(Calls::default());
    let source = StubSource::default();
    let orchestrator = TrainingOrchestrator::new(
        vec![
            StubDef::delegated("a", Behaviour::Ok, 3, &calls),
            StubDef::delegated("b", Behaviour::Ok, 3, &calls),
        ],
        refactorings(&["extract_method", "rename_field", "inline_variable"]),
        datasets(&["d1", "d2"]),
        TrainingStrategy::Delegated,
        Box::new(source.clone()),
    );

    let report = orchestrator.run().expect("run should succeed");

    let expected: Vec<(String, String)> = ["d1", "d2"]
        .iter()
        .flat_map(|d| {
            ["extract_method", "rename_field", "inline_variable"]
                .iter()
                .map(move |r| (d.to_string(), r.to_string()))
        })
        .collect();
    assert_eq!(source.retrieved(), expected);
    assert_eq!(report.len(), 12);
    assert_eq!(calls.persisted().len(), 12);

    let order: Vec<(String, String)> = report
        .combinations
        .iter()
        .take(3)
        .map(|c| (c.refactoring.clone(), c.model.clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("extract_method".to_string(), "a".to_string()),
            ("extract_method".to_string(), "b".to_string()),
            ("rename_field".to_string(), "a".to_string()),
        ]
    );
}

#[test]
fn test_retrieval_failure_is_fatal() {
    let calls = Arc::new(Calls::default());
    let source = StubSource {
        fail_on: Some("d2"),
        ..Default::default()
    };
    let orchestrator = TrainingOrchestrator::new(
        vec![StubDef::delegated("a", Behaviour::Ok, 3, &calls)],
        refactorings(&["extract_method"]),
        datasets(&["d1", "d2", "d3"]),
        TrainingStrategy::Delegated,
        Box::new(source.clone()),
    );

    let err = orchestrator.run().expect_err("retrieval failure should propagate");
    assert!(err.to_string().contains("no features for d2"));
    assert_eq!(source.retrieved().len(), 2);
    assert_eq!(calls.persisted().len(), 1);
}

#[test]
fn test_score_arrays_match_evaluation_folds() {
    let calls = Arc::new(Calls::default());
    let def = StubDef::searched("m", Behaviour::Ok, &calls);
    let features = feature_set();
    let strategy = TrainingStrategy::Search(settings());

    let outcome = strategy
        .train(def.as_ref(), &features.x, &features.y, 42, &MemoryLog::new())
        .expect("training should succeed");

    outcome.check_shape().expect("consistent shape");
    assert_eq!(outcome.n_folds(), 4);
    assert_eq!(outcome.tp.iter().sum::<usize>() + outcome.fn_.iter().sum::<usize>(), 10);
    assert_eq!(outcome.mean_accuracy(), 1.0);
    assert!(outcome.model.predict(features.x.view()).is_ok());
}

#[test]
fn test_randomized_search_evaluates_n_iter_candidates() {
    let calls = Arc::new(Calls::default());
    let def = StubDef::searched("m", Behaviour::Ok, &calls);
    let features = feature_set();
    let log = MemoryLog::new();

    TrainingStrategy::Search(settings())
        .train(def.as_ref(), &features.x, &features.y, 42, &log)
        .expect("training should succeed");

    assert_eq!(candidate_lines(&log), 5);
    // 5 candidates x 2 search folds, best refit, 4 evaluation folds, final fit
    assert_eq!(calls.model_with.load(Ordering::SeqCst), 5 * 2 + 1 + 4 + 1);
    assert_eq!(log.count_matching(&["Search started at"]), 1);
    assert_eq!(log.count_matching(&["Cross validation started at"]), 1);
}

#[test]
fn test_grid_search_evaluates_full_grid() {
    let calls = Arc::new(Calls::default());
    let space = HyperparameterSpace::new()
        .with("shift", ParameterDomain::choice([0.0, 0.01]))
        .with("depth", ParameterDomain::Discrete { low: 1, high: 3 });
    let def = StubDef::with_space("m", space, &calls);
    let features = feature_set();
    let log = MemoryLog::new();
    let strategy = TrainingStrategy::Search(SearchSettings {
        search: SearchKind::Grid,
        ..settings()
    });

    strategy
        .train(def.as_ref(), &features.x, &features.y, 42, &log)
        .expect("training should succeed");

    assert_eq!(candidate_lines(&log), 6);
}

#[test]
fn test_delegated_skips_search_and_cv() {
    let calls = Arc::new(Calls::default());
    let log = MemoryLog::new();
    let orchestrator = TrainingOrchestrator::new(
        vec![StubDef::delegated("deep", Behaviour::Ok, 10, &calls)],
        refactorings(&["extract_method"]),
        datasets(&["d1"]),
        TrainingStrategy::Delegated,
        Box::new(StubSource::default()),
    )
    .with_log(log.clone())
    .with_seed(7);

    let report = orchestrator.run().expect("run should succeed");

    assert_eq!(report.n_failed(), 0);
    assert_eq!(calls.run.load(Ordering::SeqCst), 1);
    assert_eq!(calls.model.load(Ordering::SeqCst), 0);
    assert_eq!(calls.model_with.load(Ordering::SeqCst), 0);
    assert_eq!(calls.params_to_tune.load(Ordering::SeqCst), 0);
    assert_eq!(*calls.seeds.lock().expect("lock"), vec![7]);
    assert_eq!(log.count_matching(&["Search started"]), 0);

    let summary = report.combinations[0].result.as_ref().expect("success");
    assert_eq!(summary.n_folds, 10);
}

#[test]
fn test_search_strategy_needs_search_capabilities() {
    let calls = Arc::new(Calls::default());
    let def = StubDef::delegated("deep", Behaviour::Ok, 3, &calls);
    let features = feature_set();

    let err = TrainingStrategy::Search(settings())
        .train(def.as_ref(), &features.x, &features.y, 42, &MemoryLog::new())
        .expect_err("delegated-only definition cannot be searched");
    assert!(matches!(err, Error::Unsupported { capability: "model", .. }));
}

#[test]
fn test_seed_is_reapplied_for_every_model() {
    let calls = Arc::new(Calls::default());
    let orchestrator = TrainingOrchestrator::new(
        vec![
            StubDef::delegated("a", Behaviour::Ok, 2, &calls),
            StubDef::delegated("b", Behaviour::FailFit, 2, &calls),
            StubDef::delegated("c", Behaviour::Ok, 2, &calls),
        ],
        refactorings(&["extract_method", "rename_field"]),
        datasets(&["d1"]),
        TrainingStrategy::Delegated,
        Box::new(StubSource::default()),
    );

    orchestrator.run().expect("run should succeed");
    assert_eq!(*calls.seeds.lock().expect("lock"), vec![DEFAULT_SEED; 6]);
}

#[test]
fn test_timer_brackets_successful_combinations() {
    let calls = Arc::new(Calls::default());
    let timer = RecordingTimer::default();
    let orchestrator = TrainingOrchestrator::new(
        vec![
            StubDef::delegated("a", Behaviour::Ok, 2, &calls),
            StubDef::delegated("b", Behaviour::FailFit, 2, &calls),
        ],
        refactorings(&["extract_method"]),
        datasets(&["d1"]),
        TrainingStrategy::Delegated,
        Box::new(StubSource::default()),
    )
    .with_timer(timer.clone());

    orchestrator.run().expect("run should succeed");
    assert_eq!(
        *timer.events.lock().expect("lock"),
        vec!["start", "finish d1 a extract_method", "start"]
    );
}

#[test]
fn test_log_headers_follow_iteration() {
    let calls = Arc::new(Calls::default());
    let log = MemoryLog::new();
    let orchestrator = TrainingOrchestrator::new(
        vec![StubDef::delegated("a", Behaviour::Ok, 2, &calls)],
        refactorings(&["extract_method"]),
        datasets(&["d1"]),
        TrainingStrategy::Delegated,
        Box::new(StubSource::default()),
    )
    .with_log(log.clone());

    orchestrator.run().expect("run should succeed");
    let entries = log.entries();
    assert_eq!(entries[0], "Dataset d1");
    assert_eq!(entries[1], "**** Refactoring extract_method");
    assert_eq!(entries[2], "Model a");
    assert!(entries[3].starts_with("results for d1 / extract_method / a"));
}
