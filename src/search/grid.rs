//! Exhaustive grid of candidate configurations

use super::error::Result;
use super::space::{HyperparameterSpace, ParamSet, ParameterDomain, ParameterValue};

/// Grid search generator
#[derive(Debug, Clone)]
pub struct GridSearch {
    space: HyperparameterSpace,
    /// Grid points per continuous parameter
    pub(crate) n_points: usize,
}

/// Generate grid values for a single parameter domain.
fn domain_grid_values(domain: &ParameterDomain, n_points: usize) -> Vec<ParameterValue> {
    match domain {
        ParameterDomain::Continuous { low, high, .. } if low == high => {
            vec![ParameterValue::Float(*low)]
        }
        ParameterDomain::Continuous {
            low,
            high,
            log_scale,
        } => {
            let divisor = (n_points - 1) as f64;
            if *log_scale {
                let log_low = low.ln();
                let log_high = high.ln();
                (0..n_points)
                    .map(|i| {
                        let t = i as f64 / divisor;
                        ParameterValue::Float((log_low + t * (log_high - log_low)).exp())
                    })
                    .collect()
            } else {
                (0..n_points)
                    .map(|i| {
                        let t = i as f64 / divisor;
                        ParameterValue::Float(low + t * (high - low))
                    })
                    .collect()
            }
        }
        ParameterDomain::Discrete { low, high } => {
            (*low..=*high).map(ParameterValue::Int).collect()
        }
        ParameterDomain::Choice { values } => values.clone(),
    }
}

impl GridSearch {
    /// Create new grid search
    pub fn new(space: HyperparameterSpace, n_points: usize) -> Self {
        Self {
            space,
            n_points: n_points.max(2),
        }
    }

    /// Number of configurations the grid will produce
    pub fn size(&self) -> usize {
        self.space
            .iter()
            .map(|(_, domain)| domain_grid_values(domain, self.n_points).len())
            .product()
    }

    /// Generate all grid configurations
    pub fn configurations(&self) -> Result<Vec<ParamSet>> {
        self.space.check()?;

        let param_values: Vec<(String, Vec<ParameterValue>)> = self
            .space
            .iter()
            .map(|(name, domain)| (name.clone(), domain_grid_values(domain, self.n_points)))
            .collect();

        Ok(Self::cartesian_product(&param_values))
    }

    fn cartesian_product(param_values: &[(String, Vec<ParameterValue>)]) -> Vec<ParamSet> {
        let Some(((name, values), rest)) = param_values.split_first() else {
            return vec![ParamSet::new()];
        };
        let rest_configs = Self::cartesian_product(rest);

        values
            .iter()
            .flat_map(|v| {
                rest_configs.iter().map(move |config| {
                    let mut new_config = config.clone();
                    new_config.insert(name, v.clone());
                    new_config
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_search_empty_space() {
        let grid = GridSearch::new(HyperparameterSpace::new(), 5);
        let configs = grid.configurations().expect("empty grid is valid");
        assert_eq!(configs.len(), 1); // One empty config
        assert!(configs[0].is_empty());
    }

    #[test]
    fn test_grid_search_single_param() {
        let mut space = HyperparameterSpace::new();
        space.add(
            "lr",
            ParameterDomain::Continuous {
                low: 0.0,
                high: 1.0,
                log_scale: false,
            },
        );

        let grid = GridSearch::new(space, 5);
        let configs = grid.configurations().expect("grid should build");
        assert_eq!(configs.len(), 5);

        let values: Vec<f64> = configs
            .iter()
            .map(|c| c.float_or("lr", f64::NAN).expect("lr should be a float"))
            .collect();
        assert!((values[0] - 0.0).abs() < 1e-10);
        assert!((values[4] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_grid_search_mixed_params() {
        let mut space = HyperparameterSpace::new();
        space.add("C", ParameterDomain::choice([0.01, 0.1, 1.0, 10.0]));
        space.add("class_weight", ParameterDomain::choice(["none", "balanced"]));
        space.add("max_iter", ParameterDomain::Discrete { low: 100, high: 102 });

        let grid = GridSearch::new(space, 5);
        assert_eq!(grid.size(), 24);
        assert_eq!(grid.configurations().expect("grid should build").len(), 24);
    }

    #[test]
    fn test_grid_search_log_scale() {
        let mut space = HyperparameterSpace::new();
        space.add(
            "lr",
            ParameterDomain::Continuous {
                low: 1e-4,
                high: 1e-1,
                log_scale: true,
            },
        );

        let configs = GridSearch::new(space, 4).configurations().expect("grid should build");
        let values: Vec<f64> = configs
            .iter()
            .map(|c| c.float_or("lr", f64::NAN).expect("lr should be a float"))
            .collect();

        // Log scale should give approximately: 1e-4, 1e-3, 1e-2, 1e-1
        assert!(values[0] < 1e-3);
        assert!(values[3] > 1e-2);
    }

    #[test]
    fn test_grid_search_rejects_bad_domain() {
        let space =
            HyperparameterSpace::new().with("C", ParameterDomain::Choice { values: vec![] });
        assert!(GridSearch::new(space, 3).configurations().is_err());
    }

    #[test]
    fn test_grid_search_min_n_points() {
        let grid = GridSearch::new(HyperparameterSpace::new(), 1); // Should be clamped to 2
        assert_eq!(grid.n_points, 2);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_grid_size_is_product(n_points in 2usize..8, hi in 0i64..6, n_choices in 1usize..4) {
            let space = HyperparameterSpace::new()
                .with("x", ParameterDomain::Continuous { low: 0.0, high: 1.0, log_scale: false })
                .with("k", ParameterDomain::Discrete { low: 0, high: hi })
                .with("c", ParameterDomain::choice((0..n_choices as i64).collect::<Vec<_>>()));

            let grid = GridSearch::new(space, n_points);
            let configs = grid.configurations().expect("grid should build");
            prop_assert_eq!(configs.len(), n_points * (hi as usize + 1) * n_choices);
            prop_assert_eq!(configs.len(), grid.size());
        }
    }
}
