//! Property-based tests for CLI argument parsing

use super::*;
use proptest::prelude::*;

// Strategy for valid config paths
fn config_path_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,20}\\.(yaml|yml)"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_train_command_parses(config in config_path_strategy()) {
        let cli = parse_args(["refactorml", "train", &config]);
        prop_assert!(cli.is_ok());
        match cli.expect("checked above").command {
            Command::Train(args) => {
                prop_assert_eq!(args.config.to_str(), Some(config.as_str()));
            }
            _ => prop_assert!(false, "Expected Train command"),
        }
    }

    #[test]
    fn prop_fold_overrides_round_trip(
        config in config_path_strategy(),
        n_cv in 2usize..50,
        n_cv_search in 2usize..50,
    ) {
        let n_cv_str = n_cv.to_string();
        let n_cv_search_str = n_cv_search.to_string();
        let cli = parse_args([
            "refactorml", "train", &config,
            "--n-cv", &n_cv_str,
            "--n-cv-search", &n_cv_search_str,
        ]);
        prop_assert!(cli.is_ok());
        match cli.expect("checked above").command {
            Command::Train(args) => {
                prop_assert_eq!(args.n_cv, Some(n_cv));
                prop_assert_eq!(args.n_cv_search, Some(n_cv_search));
            }
            _ => prop_assert!(false, "Expected Train command"),
        }
    }

    #[test]
    fn prop_seed_override(config in config_path_strategy(), seed in any::<u64>()) {
        let seed_str = seed.to_string();
        let cli = parse_args(["refactorml", "train", &config, "--seed", &seed_str]);
        prop_assert!(cli.is_ok());
        match cli.expect("checked above").command {
            Command::Train(args) => prop_assert_eq!(args.seed, Some(seed)),
            _ => prop_assert!(false, "Expected Train command"),
        }
    }

    #[test]
    fn prop_search_case_insensitive(
        search in prop::sample::select(vec![
            "grid", "GRID", "Grid", "randomized", "RANDOMIZED", "random",
        ])
    ) {
        prop_assert!(search.parse::<crate::pipeline::SearchKind>().is_ok());
    }
}
