//! CSV-backed feature retrieval

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use super::dataset::{Dataset, FeatureSet, Refactoring};
use super::scaler::{Scaler, Scaling};
use super::FeatureSource;
use crate::error::{Error, Result};

/// Reads `<root>/<dataset>/<refactoring>.csv`
///
/// The header row names the columns. One column holds the label (`1`/`0` or
/// `true`/`false`); every other column is a numeric feature.
#[derive(Clone, Debug)]
pub struct CsvFeatureStore {
    root: PathBuf,
    label_column: String,
    scaling: Scaling,
    balance: bool,
    seed: u64,
}

impl CsvFeatureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            label_column: "prediction".to_string(),
            scaling: Scaling::MinMax,
            balance: false,
            seed: 42,
        }
    }

    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = column.into();
        self
    }

    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    /// Undersample the majority class down to the minority size
    pub fn with_balance(mut self, balance: bool) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// File holding the instances of one (dataset, refactoring) pair
    pub fn path_for(&self, dataset: &Dataset, refactoring: &Refactoring) -> PathBuf {
        self.root
            .join(dataset.as_str())
            .join(format!("{}.csv", refactoring.name()))
    }

    fn read_raw(&self, path: &Path) -> Result<(Vec<String>, Array2<f64>, Array1<usize>)> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(source) => Error::io(path, source),
            other => Error::InvalidData(format!("{}: {other:?}", path.display())),
        })?;

        let headers = reader.headers()?.clone();
        let label_idx = headers
            .iter()
            .position(|h| h == self.label_column)
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "{}: no label column '{}'",
                    path.display(),
                    self.label_column
                ))
            })?;
        let features: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut values: Vec<f64> = Vec::new();
        let mut labels: Vec<usize> = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            for (col, field) in record.iter().enumerate() {
                if col == label_idx {
                    labels.push(parse_label(field).ok_or_else(|| {
                        Error::InvalidData(format!(
                            "{}: row {}: bad label '{field}'",
                            path.display(),
                            row + 1
                        ))
                    })?);
                } else {
                    values.push(field.trim().parse::<f64>().map_err(|_| {
                        Error::InvalidData(format!(
                            "{}: row {}, column '{}': '{field}' is not a number",
                            path.display(),
                            row + 1,
                            &headers[col]
                        ))
                    })?);
                }
            }
        }

        let x = Array2::from_shape_vec((labels.len(), features.len()), values)
            .map_err(|e| Error::InvalidData(format!("{}: {e}", path.display())))?;
        Ok((features, x, Array1::from_vec(labels)))
    }

    /// Row indices that keep every minority instance and an equal-size
    /// random subset of the majority, in file order
    fn balanced_rows(&self, y: &Array1<usize>) -> Vec<usize> {
        let (pos, neg): (Vec<usize>, Vec<usize>) = (0..y.len()).partition(|&i| y[i] == 1);
        let (minority, majority) = if pos.len() <= neg.len() { (pos, neg) } else { (neg, pos) };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut keep: Vec<usize> = index::sample(&mut rng, majority.len(), minority.len())
            .into_iter()
            .map(|i| majority[i])
            .chain(minority)
            .collect();
        keep.sort_unstable();
        keep
    }
}

fn parse_label(field: &str) -> Option<usize> {
    match field.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(1),
        "0" | "false" => Some(0),
        _ => None,
    }
}

impl FeatureSource for CsvFeatureStore {
    fn retrieve(&self, dataset: &Dataset, refactoring: &Refactoring) -> Result<FeatureSet> {
        let path = self.path_for(dataset, refactoring);
        let (features, mut x, mut y) = self.read_raw(&path)?;

        if self.balance {
            let rows = self.balanced_rows(&y);
            x = x.select(ndarray::Axis(0), &rows);
            y = y.select(ndarray::Axis(0), &rows);
        }

        let (scaler, x) = Scaler::fit_transform(self.scaling, &x)?;
        let set = FeatureSet::new(features, x, y, scaler)?;

        tracing::info!(
            dataset = %dataset,
            refactoring = refactoring.name(),
            instances = set.n_samples(),
            positives = set.n_positive(),
            features = set.features.len(),
            "retrieved labelled instances"
        );
        Ok(set)
    }
}
