//! The solver pipeline: drives naive, then sparse, then thorough, in that fixed order, each
//! bounded by the problem's tuning parameters, falling through on failure.

mod common;
mod naive;
mod sparse;
mod thorough;

use fnv::FnvHashMap;

use crate::debug_info::AttemptRecord;
use crate::debug_info::RandomizationDebugInfo;
use crate::debug_info::StrategyKind;
use crate::debug_info::StrategyOutcome;
use crate::debug_info::DEBUG_ATTEMPT_CAP;
use crate::predicate::MultiConstraint;
use crate::problem::MultiVarProblem;
use crate::rand_var::RandVar;
use crate::value::Value;
use crate::Assignment;
use common::StrategyContext;

/// The states a single `randomize` call passes through. Any strategy phase is skipped when its
/// flag is off; `Success` and `Failure` are terminal and mutually exclusive. `solve` below *is*
/// this state machine — the enum exists to document the contract, not to add indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    Init,
    FixedValuesApplied,
    NaiveAttempting,
    SparseAttempting,
    ThoroughAttempting,
    Success,
    Failure,
}

fn is_precondition_violation(reason: &str) -> bool {
    reason.contains("function domain")
        || reason.contains("list variable")
        || reason.contains("too large to enumerate")
        || reason.contains("exceeds max_domain_size")
}

/// Re-checks a returned assignment against every constraint it should satisfy. Only compiled in
/// when the `debug-checks` feature is enabled; a solver bug here should fail loudly in a
/// development build rather than silently hand back a violating assignment.
#[cfg(feature = "debug-checks")]
fn verify_solution(assignment: &Assignment, constraints: &[&MultiConstraint]) {
    let mut faults = crate::predicate::FaultLog::default();
    for constraint in constraints {
        if !common::constraint_ready(constraint, assignment) {
            continue;
        }
        let values: Vec<Value> = constraint
            .variables
            .iter()
            .map(|name| assignment.get(name).cloned().unwrap())
            .collect();
        debug_assert!(
            crate::predicate::eval_multi(constraint, &values, &mut faults),
            "debug-checks: solver returned an assignment violating constraint {:?}",
            constraint.name
        );
    }
}

#[cfg(not(feature = "debug-checks"))]
fn verify_solution(_assignment: &Assignment, _constraints: &[&MultiConstraint]) {}

/// Folds a strategy's retained violating attempts into the overall debug record, respecting the
/// combined cap across all strategies.
fn fold_attempts(
    debug_info: &mut RandomizationDebugInfo,
    strategy: StrategyKind,
    attempts: Vec<Assignment>,
) {
    for assignment in attempts {
        if debug_info.attempts.len() >= DEBUG_ATTEMPT_CAP {
            debug_info.attempts_truncated = true;
            break;
        }
        debug_info.attempts.push(AttemptRecord { strategy, assignment });
    }
}

pub(crate) fn solve(
    problem: &mut MultiVarProblem,
    with_constraints: &[MultiConstraint],
    with_values: &FnvHashMap<String, Value>,
    debug: bool,
) -> Result<Assignment, RandomizationDebugInfo> {
    let _state = SolveState::Init;
    let flags = problem.solver_flags();
    let max_iterations = problem.max_iterations();
    let max_domain_size = problem.max_domain_size();

    let (var_store, standing_constraints, rng) = problem.solver_parts();
    let vars: Vec<&RandVar> = var_store.iter().collect();
    let mut constraints: Vec<&MultiConstraint> = standing_constraints.iter().collect();
    constraints.extend(with_constraints.iter());

    let _state = SolveState::FixedValuesApplied;
    let mut debug_info = RandomizationDebugInfo::default();

    if flags.naive {
        let _state = SolveState::NaiveAttempting;
        let mut ctx = StrategyContext {
            vars: vars.clone(),
            constraints: constraints.clone(),
            fixed: with_values,
            max_iterations,
            max_domain_size,
            rng: &mut *rng,
        };
        let outcome = naive::run(&mut ctx, debug);
        debug_info.naive = outcome.debug;
        debug_info.predicate_faults.extend(outcome.faults.into_faults());
        if debug {
            fold_attempts(&mut debug_info, StrategyKind::Naive, outcome.attempts);
        }

        if let Some(assignment) = outcome.assignment {
            debug_info
                .strategies_attempted
                .push((StrategyKind::Naive, StrategyOutcome::Succeeded));
            log::debug!("randomize: solved via naive strategy");
            verify_solution(&assignment, &constraints);
            return Ok(assignment);
        }
        debug_info
            .strategies_attempted
            .push((StrategyKind::Naive, StrategyOutcome::Exhausted));
    } else {
        debug_info
            .strategies_attempted
            .push((StrategyKind::Naive, StrategyOutcome::Disabled));
    }

    if flags.sparse {
        let _state = SolveState::SparseAttempting;
        let mut ctx = StrategyContext {
            vars: vars.clone(),
            constraints: constraints.clone(),
            fixed: with_values,
            max_iterations,
            max_domain_size,
            rng: &mut *rng,
        };
        let outcome = sparse::run(&mut ctx, debug);
        debug_info.sparse = outcome.debug;
        debug_info.predicate_faults.extend(outcome.faults.into_faults());
        if debug {
            fold_attempts(&mut debug_info, StrategyKind::Sparse, outcome.attempts);
        }

        if let Some(assignment) = outcome.assignment {
            debug_info
                .strategies_attempted
                .push((StrategyKind::Sparse, StrategyOutcome::Succeeded));
            log::debug!("randomize: solved via sparse strategy");
            verify_solution(&assignment, &constraints);
            return Ok(assignment);
        }
        debug_info
            .strategies_attempted
            .push((StrategyKind::Sparse, StrategyOutcome::Exhausted));
    } else {
        debug_info
            .strategies_attempted
            .push((StrategyKind::Sparse, StrategyOutcome::Disabled));
    }

    if flags.thorough {
        let _state = SolveState::ThoroughAttempting;
        let mut ctx = StrategyContext {
            vars: vars.clone(),
            constraints: constraints.clone(),
            fixed: with_values,
            max_iterations,
            max_domain_size,
            rng: &mut *rng,
        };
        let outcome = thorough::run(&mut ctx, debug);
        debug_info.thorough = outcome.debug;
        debug_info.predicate_faults.extend(outcome.faults.into_faults());
        if debug {
            fold_attempts(&mut debug_info, StrategyKind::Thorough, outcome.attempts);
        }

        if let Some(assignment) = outcome.assignment {
            debug_info
                .strategies_attempted
                .push((StrategyKind::Thorough, StrategyOutcome::Succeeded));
            log::debug!("randomize: solved via thorough strategy");
            verify_solution(&assignment, &constraints);
            return Ok(assignment);
        }

        let outcome_tag = match debug_info.thorough.refusal_reason.as_deref() {
            Some(reason) if is_precondition_violation(reason) => {
                log::warn!("randomize: thorough strategy precondition violated: {reason}");
                StrategyOutcome::PreconditionViolation(reason.to_string())
            }
            _ => StrategyOutcome::Exhausted,
        };
        debug_info
            .strategies_attempted
            .push((StrategyKind::Thorough, outcome_tag));
    } else {
        debug_info
            .strategies_attempted
            .push((StrategyKind::Thorough, StrategyOutcome::Disabled));
    }

    let _state = SolveState::Failure;
    log::debug!("randomize: all enabled strategies failed");
    Err(debug_info)
}
