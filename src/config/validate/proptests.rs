//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::tests::create_valid_config;
use super::validator::validate_config;
use crate::pipeline::SearchKind;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_training_params_pass(
        n_cv in 2usize..20,
        n_cv_search in 2usize..20,
        n_iter in 1usize..500,
        grid_points in 2usize..10,
        grid in any::<bool>(),
    ) {
        let mut config = create_valid_config();
        config.training.n_cv = n_cv;
        config.training.n_cv_search = n_cv_search;
        config.training.n_iter_random_search = n_iter;
        config.training.grid_points = grid_points;
        config.training.search = if grid { SearchKind::Grid } else { SearchKind::Randomized };
        prop_assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn prop_too_few_folds_rejected(n_cv in 0usize..2) {
        let mut config = create_valid_config();
        config.training.n_cv = n_cv;
        prop_assert_eq!(
            validate_config(&config),
            Err(ValidationError::InvalidFolds { name: "n_cv", value: n_cv })
        );
    }

    #[test]
    fn prop_unregistered_names_rejected(name in "[a-z]{3,12}_model") {
        let mut config = create_valid_config();
        config.models.push(name.clone());
        prop_assert_eq!(validate_config(&config), Err(ValidationError::UnknownModel(name)));
    }
}
