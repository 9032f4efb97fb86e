//! The crate's error taxonomy.
//!
//! Configuration errors are fatal at build time and are returned synchronously from
//! [`crate::problem::MultiVarProblem::add_var`] / `add_constraint` / `set_tuning`.
//! [`RandomizationError`] is the single error `randomize` can return; it always carries a
//! [`crate::debug_info::RandomizationDebugInfo`].

use thiserror::Error;

use crate::debug_info::RandomizationDebugInfo;

/// Errors raised immediately when a problem is misconfigured, never deferred to `randomize`.
#[derive(Debug, Error, Clone)]
pub enum ConfigurationError {
    #[error("variable `{0}` already exists in this problem")]
    DuplicateVariable(String),

    #[error("variable `{name}` was given conflicting domain fields: {reason}")]
    ConflictingDomainSpec { name: String, reason: String },

    #[error("constraint `{constraint}` references unknown variable `{variable}`")]
    UnknownVariable {
        constraint: String,
        variable: String,
    },

    #[error("list constraint `{constraint}` was declared on scalar variable `{variable}` (length == 0)")]
    ListConstraintOnScalar {
        constraint: String,
        variable: String,
    },

    #[error("tuning parameter `{parameter}` must be positive, got {value}")]
    InvalidTuning { parameter: String, value: i64 },
}

/// The single error surfaced by [`crate::problem::MultiVarProblem::randomize`] when every
/// enabled strategy fails to find a satisfying assignment.
#[derive(Debug, Error)]
#[error("randomization failed: every enabled strategy was exhausted without finding a satisfying assignment")]
pub struct RandomizationError {
    pub debug_info: RandomizationDebugInfo,
}

impl RandomizationError {
    pub fn new(debug_info: RandomizationDebugInfo) -> Self {
        RandomizationError { debug_info }
    }
}
