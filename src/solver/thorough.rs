//! A complete CSP enumerator.
//!
//! Builds the full product space of every free (non-fixed) variable's enumerated domain, prunes
//! with a backtracking search, collects every satisfying assignment, and draws one uniformly at
//! random via the shared random source. Refuses up front if any free variable cannot be fully
//! enumerated (a function-domain variable, a list variable, or a domain whose size pushes the
//! product past `max_domain_size`).

use crate::assignment::Assignment;
use crate::debug_info::ThoroughDebugInfo;
use crate::domain::Domain;
use crate::predicate::FaultLog;
use crate::rand_var::RandVar;
use crate::solver::common::check_ready_constraints;
use crate::solver::common::constraint_ready;
use crate::solver::common::StrategyContext;

pub(crate) struct ThoroughOutcome {
    pub(crate) assignment: Option<Assignment>,
    pub(crate) debug: ThoroughDebugInfo,
    pub(crate) faults: FaultLog,
    pub(crate) attempts: Vec<Assignment>,
}

/// Why a variable made the thorough strategy refuse to run at all.
fn refusal_reason(var: &RandVar) -> Option<String> {
    if var.length > 0 {
        return Some(format!(
            "variable `{}` is a list variable; the thorough strategy only enumerates scalar variables",
            var.name
        ));
    }
    if matches!(var.domain, Domain::Function(..)) {
        return Some(format!(
            "variable `{}` has a function domain, which cannot be enumerated",
            var.name
        ));
    }
    if !var.domain.is_fully_enumerable() {
        return Some(format!(
            "variable `{}` has a domain too large to fully enumerate",
            var.name
        ));
    }
    None
}

pub(crate) fn run(ctx: &mut StrategyContext, debug_attempts: bool) -> ThoroughOutcome {
    let mut debug = ThoroughDebugInfo::default();
    let mut faults = FaultLog::default();
    let mut attempts = Vec::new();

    let free_vars: Vec<&RandVar> = ctx.free_vars().map(|v| *v).collect();

    for var in &free_vars {
        if let Some(reason) = refusal_reason(var) {
            debug.refusal_reason = Some(reason);
            return ThoroughOutcome {
                assignment: None,
                debug,
                faults,
                attempts,
            };
        }
    }

    let mut product: u64 = 1;
    for var in &free_vars {
        let size = var.domain.size().unwrap_or(u64::MAX);
        product = product.saturating_mul(size.max(1));
        if product > ctx.max_domain_size {
            debug.refusal_reason = Some(format!(
                "domain product {product} exceeds max_domain_size {}",
                ctx.max_domain_size
            ));
            debug.domain_product_size = Some(product);
            return ThoroughOutcome {
                assignment: None,
                debug,
                faults,
                attempts,
            };
        }
    }
    debug.domain_product_size = Some(product);

    let candidates: Vec<Vec<i64>> = free_vars
        .iter()
        .map(|var| var.enumerate_candidates(ctx.rng, var.domain.size().unwrap_or(0) as usize, &mut faults))
        .collect();

    let mut solutions = Vec::new();
    let base = ctx.base_assignment();
    let mut current = base.clone();
    backtrack(
        0,
        &free_vars,
        &candidates,
        &mut current,
        &ctx.constraints,
        &mut faults,
        &mut solutions,
        debug_attempts,
        &mut attempts,
    );
    debug.solutions_found = solutions.len();

    if solutions.is_empty() {
        if debug.refusal_reason.is_none() {
            debug.refusal_reason = Some("no satisfying assignment exists in the full product space".to_string());
        }
        return ThoroughOutcome {
            assignment: None,
            debug,
            faults,
            attempts,
        };
    }

    let idx = ctx.rng.uniform_index(solutions.len());
    ThoroughOutcome {
        assignment: Some(solutions.swap_remove(idx)),
        attempts,
        debug,
        faults,
    }
}

#[allow(clippy::too_many_arguments)]
fn backtrack(
    depth: usize,
    vars: &[&RandVar],
    candidates: &[Vec<i64>],
    assignment: &mut Assignment,
    constraints: &[&crate::predicate::MultiConstraint],
    faults: &mut FaultLog,
    solutions: &mut Vec<Assignment>,
    debug_attempts: bool,
    attempts: &mut Vec<Assignment>,
) {
    if depth == vars.len() {
        let failed = check_ready_constraints(constraints, assignment, faults);
        if failed.is_empty() {
            solutions.push(assignment.clone());
        } else if debug_attempts && attempts.len() < crate::debug_info::DEBUG_ATTEMPT_CAP {
            attempts.push(assignment.clone());
        }
        return;
    }

    let var = vars[depth];
    for &value in &candidates[depth] {
        assignment.set(var.name.clone(), crate::value::Value::Int(value));

        let newly_ready: Vec<&&crate::predicate::MultiConstraint> = constraints
            .iter()
            .filter(|c| c.variables.contains(&var.name) && constraint_ready(c, assignment))
            .collect();
        let satisfied = newly_ready.iter().all(|c| {
            let values: Vec<_> = c
                .variables
                .iter()
                .map(|name| assignment.get(name).cloned().unwrap())
                .collect();
            crate::predicate::eval_multi(c, &values, faults)
        });

        if satisfied {
            backtrack(
                depth + 1,
                vars,
                candidates,
                assignment,
                constraints,
                faults,
                solutions,
                debug_attempts,
                attempts,
            );
        } else if debug_attempts && attempts.len() < crate::debug_info::DEBUG_ATTEMPT_CAP {
            attempts.push(assignment.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use fnv::FnvHashMap;

    use super::*;
    use crate::domain::Domain;
    use crate::predicate::MultiConstraint;
    use crate::random::RandomSource;

    #[test]
    fn enumerates_small_space_and_finds_solution() {
        let x = RandVar::new("x".to_string(), Domain::BitWidth(3));
        let y = RandVar::new("y".to_string(), Domain::BitWidth(3));
        let constraint = MultiConstraint {
            name: Some("eq".to_string()),
            variables: vec!["x".to_string(), "y".to_string()],
            predicate: Box::new(|values| values[0].as_int().unwrap() == values[1].as_int().unwrap()),
        };
        let fixed = FnvHashMap::default();
        let mut rng = RandomSource::new(5);
        let mut ctx = StrategyContext {
            vars: vec![&x, &y],
            constraints: vec![&constraint],
            fixed: &fixed,
            max_iterations: 100,
            max_domain_size: 1000,
            rng: &mut rng,
        };
        let outcome = run(&mut ctx, false);
        let assignment = outcome.assignment.expect("8x8 space must contain equal pairs");
        assert_eq!(assignment.get("x"), assignment.get("y"));
        assert_eq!(outcome.debug.solutions_found, 8);
    }

    #[test]
    fn refuses_function_domain_variable() {
        let f = RandVar::new(
            "f".to_string(),
            Domain::Function(Box::new(|_, _| crate::value::Value::Int(1)), vec![]),
        );
        let fixed = FnvHashMap::default();
        let mut rng = RandomSource::new(0);
        let mut ctx = StrategyContext {
            vars: vec![&f],
            constraints: vec![],
            fixed: &fixed,
            max_iterations: 10,
            max_domain_size: 1000,
            rng: &mut rng,
        };
        let outcome = run(&mut ctx, false);
        assert!(outcome.assignment.is_none());
        assert!(outcome.debug.refusal_reason.is_some());
    }

    #[test]
    fn refuses_when_domain_product_too_large() {
        let x = RandVar::new("x".to_string(), Domain::BitWidth(20));
        let y = RandVar::new("y".to_string(), Domain::BitWidth(20));
        let fixed = FnvHashMap::default();
        let mut rng = RandomSource::new(0);
        let mut ctx = StrategyContext {
            vars: vec![&x, &y],
            constraints: vec![],
            fixed: &fixed,
            max_iterations: 10,
            max_domain_size: 1000,
            rng: &mut rng,
        };
        let outcome = run(&mut ctx, false);
        assert!(outcome.assignment.is_none());
        assert!(outcome.debug.refusal_reason.unwrap().contains("exceeds max_domain_size"));
    }
}
