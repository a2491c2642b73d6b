//! Per-combination timing

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::data::Dataset;

/// Brackets the training of one combination
pub trait Timer: Send + Sync {
    fn start(&self);
    fn finish(&self, dataset: &Dataset, model: &str, refactoring: &str);
}

/// Logs the wall time of each combination and keeps the measurements
#[derive(Debug, Default)]
pub struct Stopwatch {
    started: Mutex<Option<Instant>>,
    laps: Mutex<Vec<Lap>>,
}

/// One measured combination
#[derive(Clone, Debug, PartialEq)]
pub struct Lap {
    pub dataset: Dataset,
    pub model: String,
    pub refactoring: String,
    pub elapsed: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn laps(&self) -> Vec<Lap> {
        self.laps.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Timer for Stopwatch {
    fn start(&self) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
    }

    fn finish(&self, dataset: &Dataset, model: &str, refactoring: &str) {
        let begun = self.started.lock().ok().and_then(|mut s| s.take());
        let Some(begun) = begun else {
            tracing::warn!(%dataset, model, refactoring, "timer finished without start");
            return;
        };
        let elapsed = begun.elapsed();
        tracing::info!(
            %dataset,
            model,
            refactoring,
            elapsed_ms = elapsed.as_millis() as u64,
            "combination finished"
        );
        if let Ok(mut laps) = self.laps.lock() {
            laps.push(Lap {
                dataset: dataset.clone(),
                model: model.to_string(),
                refactoring: refactoring.to_string(),
                elapsed,
            });
        }
    }
}
