//! Pure rejection sampling over the joint space.
//!
//! Draws every variable once, in insertion order, and accepts the first attempt where every
//! local and multi-variable constraint holds. Shines on loosely coupled variables with high
//! solution density — which describes most hardware-verification field masks and range checks.

use crate::assignment::Assignment;
use crate::debug_info::NaiveDebugInfo;
use crate::debug_info::DEBUG_ATTEMPT_CAP;
use crate::predicate::FaultLog;
use crate::solver::common::check_ready_constraints;
use crate::solver::common::StrategyContext;

pub(crate) struct NaiveOutcome {
    pub(crate) assignment: Option<Assignment>,
    pub(crate) debug: NaiveDebugInfo,
    pub(crate) faults: FaultLog,
    /// Violating attempts, retained only when `debug` was requested, capped at
    /// [`DEBUG_ATTEMPT_CAP`].
    pub(crate) attempts: Vec<Assignment>,
}

pub(crate) fn run(ctx: &mut StrategyContext, debug_attempts: bool) -> NaiveOutcome {
    let mut debug = NaiveDebugInfo::default();
    let mut faults = FaultLog::default();
    let mut attempts = Vec::new();

    for iteration in 0..ctx.max_iterations {
        debug.iterations_used = iteration + 1;

        let mut assignment = ctx.base_assignment();
        let mut locals_ok = true;
        for var in ctx.free_vars() {
            let (value, ok) = var.draw(ctx.rng, &mut faults);
            locals_ok &= ok;
            assignment.set(var.name.clone(), value);
        }

        let failed = check_ready_constraints(&ctx.constraints, &assignment, &mut faults);

        if locals_ok && failed.is_empty() {
            return NaiveOutcome {
                assignment: Some(assignment),
                debug,
                faults,
                attempts,
            };
        }

        if debug_attempts && attempts.len() < DEBUG_ATTEMPT_CAP {
            attempts.push(assignment.clone());
        }
        debug.last_violating_assignment = Some(assignment);
    }

    NaiveOutcome {
        assignment: None,
        debug,
        faults,
        attempts,
    }
}
