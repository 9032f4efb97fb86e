//! Diagnostic information retained across a `randomize` call, surfaced via
//! [`crate::error::RandomizationError`] on failure and otherwise discarded.

use crate::assignment::Assignment;
use crate::predicate::PredicateFault;

/// Cap on the number of attempt records retained when `debug = true`, to bound memory use on
/// pathological problems.
pub const DEBUG_ATTEMPT_CAP: usize = 10_000;

/// Which of the three strategies a solve attempt ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Naive,
    Sparse,
    Thorough,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StrategyKind::Naive => "naive",
            StrategyKind::Sparse => "sparse",
            StrategyKind::Thorough => "thorough",
        };
        f.write_str(name)
    }
}

/// Whether, and why, a strategy did not run or did not succeed.
#[derive(Debug, Clone)]
pub enum StrategyOutcome {
    /// The strategy was disabled via `solver_flags`.
    Disabled,
    /// The strategy ran but exhausted its effort budget without success.
    Exhausted,
    /// The strategy refused to run at all because a precondition was violated (e.g. a
    /// function-domain variable was handed to the thorough strategy).
    PreconditionViolation(String),
    /// The strategy found a satisfying assignment.
    Succeeded,
}

/// Counters and diagnostic detail from a single naive-strategy attempt.
#[derive(Debug, Clone, Default)]
pub struct NaiveDebugInfo {
    pub iterations_used: usize,
    pub last_violating_assignment: Option<Assignment>,
}

/// Counters and diagnostic detail from a single sparse-strategy attempt.
#[derive(Debug, Clone, Default)]
pub struct SparseDebugInfo {
    pub groups_attempted: usize,
    pub node_visits: usize,
    pub max_width_reached: usize,
    pub widen_count: usize,
    pub deepest_partial_assignment: Assignment,
}

/// Counters and diagnostic detail from a single thorough-strategy attempt.
#[derive(Debug, Clone, Default)]
pub struct ThoroughDebugInfo {
    pub domain_product_size: Option<u64>,
    pub refusal_reason: Option<String>,
    pub solutions_found: usize,
}

/// One record of a predicate that failed against a specific variable tuple, retained for
/// diagnostics regardless of the `debug` flag.
#[derive(Debug, Clone)]
pub struct FailedPredicateRecord {
    pub constraint_name: Option<String>,
    pub variables: Vec<String>,
}

/// One retained violating attempt, only populated when `debug = true`.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub strategy: StrategyKind,
    pub assignment: Assignment,
}

/// The full diagnostic payload returned alongside a [`crate::error::RandomizationError`].
#[derive(Debug, Clone, Default)]
pub struct RandomizationDebugInfo {
    pub strategies_attempted: Vec<(StrategyKind, StrategyOutcome)>,
    pub naive: NaiveDebugInfo,
    pub sparse: SparseDebugInfo,
    pub thorough: ThoroughDebugInfo,
    pub failed_predicates: Vec<FailedPredicateRecord>,
    pub predicate_faults: Vec<PredicateFault>,
    /// Populated only when `randomize` was called with `debug = true`.
    pub attempts: Vec<AttemptRecord>,
    pub attempts_truncated: bool,
}
