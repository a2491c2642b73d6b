//! Hyperparameter search
//!
//! Candidate generation (randomized or exhaustive grid) over a
//! [`HyperparameterSpace`], scored with stratified k-fold cross-validation.
//!
//! # Example
//!
//! ```ignore
//! use refactorml::search::{HyperparameterSpace, ParameterDomain, SearchCv, SearchMethod};
//!
//! let mut space = HyperparameterSpace::new();
//! space.add("learning_rate", ParameterDomain::Continuous {
//!     low: 1e-3, high: 1.0, log_scale: true
//! });
//!
//! let search = SearchCv::new(SearchMethod::Randomized { n_iter: 20 }, 5);
//! let outcome = search.fit(|params| definition.model_with(params), &space, &x, &y)?;
//! println!("best {} = {:.4}", outcome.best_params, outcome.best_score);
//! ```

mod error;
mod grid;
mod randomized;
mod search_cv;
mod space;
mod trial;


pub use error::SearchError;
pub use grid::GridSearch;
pub use randomized::RandomizedSearch;
pub use search_cv::{SearchCv, SearchMethod, SearchOutcome};
pub use space::{HyperparameterSpace, ParamSet, ParameterDomain, ParameterValue};
pub use trial::{Trial, TrialStatus};
