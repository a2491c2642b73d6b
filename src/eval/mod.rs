//! Binary classification evaluation
//!
//! - `confusion`: tp / tn / fp / fn counts and the rates derived from them
//! - `scorer`: per-fold scoring functions
//! - `kfold`: stratified k-fold splitting
//! - `cross_validate`: fold-parallel evaluation of a classifier factory
//!
//! ## Example
//!
//! ```ignore
//! use refactorml::eval::{cross_validate, Scorer, StratifiedKFold};
//!
//! let cv = StratifiedKFold::new(10).with_seed(42);
//! let factory = || definition.model_with(&best);
//! let scores = cross_validate(factory, &x, &y, &cv, &Scorer::EVALUATION, true)?;
//! println!("precision: {:.3}", scores.mean(Scorer::Precision)?);
//! ```

mod confusion;
pub(crate) mod cross_validate;
mod kfold;
mod scorer;


pub use confusion::{BinaryConfusion, POSITIVE};
pub use cross_validate::{cross_validate, CvScores, FoldResult};
pub use kfold::{Fold, StratifiedKFold};
pub use scorer::Scorer;
