//! # constrainedrandom
//!
//! A declarative constrained-randomization engine in the style of hardware verification
//! languages: declare random variables with typed domains, attach constraints, and ask for a
//! reproducible, seeded solution.
//!
//! A [`MultiVarProblem`] owns the variables, the standing constraints between them, and the
//! single [`RandomSource`] every draw in its lifetime flows through — the same seed always
//! produces the same sequence of [`randomize`][MultiVarProblem::randomize] results.
//!
//! ```rust
//! use constrainedrandom::{MultiVarProblem, RandomizeOptions, VarSpec};
//!
//! let mut problem = MultiVarProblem::new(42);
//!
//! problem.add_var("a", VarSpec::bits(4)).unwrap();
//! problem.add_var("b", VarSpec::bits(4)).unwrap();
//!
//! problem
//!     .add_constraint(Some("sum_over_5"), &["a", "b"], Box::new(|values| {
//!         values[0].as_int().unwrap() + values[1].as_int().unwrap() > 5
//!     }))
//!     .unwrap();
//!
//! let assignment = problem.randomize(RandomizeOptions::default()).unwrap();
//! let sum = assignment.get("a").unwrap().as_int().unwrap()
//!     + assignment.get("b").unwrap().as_int().unwrap();
//! assert!(sum > 5);
//! ```
//!
//! Randomization runs three strategies in a fixed order — naive rejection sampling, then a
//! layered search grouped by an ordering hint, then a full CSP enumeration — falling through to
//! the next only when the previous one exhausts its effort budget. See
//! [`MultiVarProblem::randomize`] for the per-call contract and [`RandomizationError`] for what
//! is retained when every strategy fails.

pub mod assignment;
pub mod debug_info;
pub mod domain;
pub mod error;
pub mod predicate;
pub mod problem;
pub mod rand_var;
pub mod random;
mod solver;
pub mod value;
pub mod var_store;

pub use assignment::Assignment;
pub use debug_info::AttemptRecord;
pub use debug_info::FailedPredicateRecord;
pub use debug_info::NaiveDebugInfo;
pub use debug_info::RandomizationDebugInfo;
pub use debug_info::SparseDebugInfo;
pub use debug_info::StrategyKind;
pub use debug_info::StrategyOutcome;
pub use debug_info::ThoroughDebugInfo;
pub use domain::Domain;
pub use domain::DomainFn;
pub use domain::WeightedEntry;
pub use domain::WeightedKey;
pub use error::ConfigurationError;
pub use error::RandomizationError;
pub use predicate::ListPredicate;
pub use predicate::MultiConstraint;
pub use predicate::MultiPredicate;
pub use predicate::NamedListConstraint;
pub use predicate::NamedScalarConstraint;
pub use predicate::PredicateFault;
pub use predicate::ScalarPredicate;
pub use problem::MultiVarProblem;
pub use problem::RandomizeOptions;
pub use problem::SolverFlags;
pub use problem::VarSpec;
pub use rand_var::RandVar;
pub use random::RandomSource;
pub use value::Value;
pub use var_store::VarStore;

#[cfg(test)]
mod tests;
