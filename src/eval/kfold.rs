//! Stratified K-Fold cross-validation splitter

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Error, Result};

/// Train/test index pair for one fold
pub type Fold = (Vec<usize>, Vec<usize>);

/// K-Fold splitter that keeps class proportions in every fold
#[derive(Clone, Debug)]
pub struct StratifiedKFold {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

impl StratifiedKFold {
    /// Create a new splitter (shuffled, seed 42)
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed: 42,
        }
    }

    /// Set random seed for shuffling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Disable shuffling
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate train/test indices for each fold
    ///
    /// Fails when fewer than two classes are present or when any class has
    /// fewer members than there are folds.
    pub fn split(&self, y: &[usize]) -> Result<Vec<Fold>> {
        if self.n_splits < 2 {
            return Err(Error::InvalidParameter(format!(
                "n_splits must be >= 2, got {}",
                self.n_splits
            )));
        }

        let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, &label) in y.iter().enumerate() {
            by_class.entry(label).or_default().push(i);
        }

        if by_class.len() < 2 {
            return Err(Error::stratification(format!(
                "need at least two classes, found {}",
                by_class.len()
            )));
        }
        if let Some((label, members)) = by_class.iter().find(|(_, m)| m.len() < self.n_splits) {
            return Err(Error::stratification(format!(
                "class {label} has {} members, fewer than n_splits={}",
                members.len(),
                self.n_splits
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut test_folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];

        // Deal each class round-robin, continuing where the previous class
        // stopped so remainders spread over different folds.
        let mut offset = 0;
        for members in by_class.values_mut() {
            if self.shuffle {
                members.shuffle(&mut rng);
            }
            for (j, &idx) in members.iter().enumerate() {
                test_folds[(offset + j) % self.n_splits].push(idx);
            }
            offset += members.len();
        }

        let folds = test_folds
            .into_iter()
            .map(|mut test| {
                test.sort_unstable();
                let mut in_test = vec![false; y.len()];
                for &i in &test {
                    in_test[i] = true;
                }
                let train = (0..y.len()).filter(|&i| !in_test[i]).collect();
                (train, test)
            })
            .collect();

        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_neg: usize, n_pos: usize) -> Vec<usize> {
        let mut y = vec![0; n_neg];
        y.extend(vec![1; n_pos]);
        y
    }

    #[test]
    fn test_split_covers_every_index_once() {
        let y = labels(70, 30);
        let folds = StratifiedKFold::new(5).split(&y).expect("split should succeed");
        assert_eq!(folds.len(), 5);

        let mut all_test: Vec<usize> = folds.iter().flat_map(|(_, t)| t.iter().copied()).collect();
        all_test.sort_unstable();
        assert_eq!(all_test, (0..100).collect::<Vec<_>>());

        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), 100);
        }
    }

    #[test]
    fn test_split_preserves_class_balance() {
        let y = labels(70, 30);
        let folds = StratifiedKFold::new(5).split(&y).expect("split should succeed");
        for (_, test) in &folds {
            let positives = test.iter().filter(|&&i| y[i] == 1).count();
            assert_eq!(test.len(), 20);
            assert_eq!(positives, 6);
        }
    }

    #[test]
    fn test_shuffle_seed() {
        let y = labels(50, 50);
        let a = StratifiedKFold::new(5).with_seed(42).split(&y).expect("a");
        let b = StratifiedKFold::new(5).with_seed(42).split(&y).expect("b");
        let c = StratifiedKFold::new(5).with_seed(99).split(&y).expect("c");
        assert_eq!(a, b);
        assert_ne!(a[0].1, c[0].1);
    }

    #[test]
    fn test_without_shuffle_is_ordered() {
        let y = labels(4, 4);
        let folds = StratifiedKFold::new(2).without_shuffle().split(&y).expect("split");
        assert_eq!(folds[0].1, vec![0, 2, 4, 6]);
        assert_eq!(folds[1].1, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_single_class_rejected() {
        let y = vec![1; 20];
        let err = StratifiedKFold::new(5).split(&y).expect_err("single class must fail");
        assert!(matches!(err, Error::Stratification { .. }));
    }

    #[test]
    fn test_too_few_positives_rejected() {
        let y = labels(40, 3);
        let err = StratifiedKFold::new(5).split(&y).expect_err("3 positives < 5 folds");
        assert!(err.to_string().contains("class 1 has 3 members"));
    }

    #[test]
    fn test_invalid_n_splits() {
        let y = labels(10, 10);
        assert!(matches!(
            StratifiedKFold::new(1).split(&y),
            Err(Error::InvalidParameter(_))
        ));
    }
}
