//! Randomized sampling of candidate configurations

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::error::{Result, SearchError};
use super::space::{HyperparameterSpace, ParamSet};

/// Draws a fixed number of configurations from a search space
#[derive(Debug, Clone)]
pub struct RandomizedSearch {
    space: HyperparameterSpace,
    n_iter: usize,
    seed: u64,
}

impl RandomizedSearch {
    pub fn new(space: HyperparameterSpace, n_iter: usize) -> Self {
        Self {
            space,
            n_iter,
            seed: 42,
        }
    }

    /// Set random seed for sampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Sample exactly `n_iter` configurations (with replacement)
    pub fn configurations(&self) -> Result<Vec<ParamSet>> {
        if self.n_iter == 0 {
            return Err(SearchError::NoCandidates);
        }
        self.space.check()?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok((0..self.n_iter)
            .map(|_| self.space.sample_random(&mut rng))
            .collect())
    }
}
