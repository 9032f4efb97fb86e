//! A layered, bounded, best-first search over variables grouped by `order`.
//!
//! Variables are partitioned into groups by their `order` hint (smallest first); earlier groups
//! are fixed before later groups begin. Each group is solved as a small product-space search:
//! every variable in the group gets a shuffled candidate list, explored depth-first with pruning
//! on the first constraint violation. A group that exhausts its search widens its candidate sets
//! and retries, up to a bounded number of times; if a later group cannot be solved at all, the
//! previous group is abandoned and re-solved for a fresh combination, up to a bounded number of
//! backtracks, before the whole strategy gives up.

use std::collections::BTreeMap;

use crate::assignment::Assignment;
use crate::debug_info::SparseDebugInfo;
use crate::predicate::FaultLog;
use crate::predicate::MultiConstraint;
use crate::rand_var::RandVar;
use crate::random::RandomSource;
use crate::solver::common::check_ready_constraints;
use crate::solver::common::StrategyContext;
use crate::value::Value;

/// Sibling alternatives tried at a single depth before giving up on that branch.
const GROUP_SEARCH_WIDTH: usize = 5;
/// Bounded number of times a group's candidate sets are widened before the group fails outright.
const MAX_WIDENERS: usize = 3;
/// Factor by which a group's candidate counts grow on each widen.
const WIDEN_FACTOR: usize = 2;
/// Bounded number of times a later group's failure is allowed to bounce back into an earlier
/// group for a fresh attempt.
const GROUP_BACKTRACK_ATTEMPTS: usize = 3;
/// Hard ceiling on candidates requested for a single variable, regardless of widening.
const MAX_CANDIDATES_PER_VAR: usize = 64;

pub(crate) struct SparseOutcome {
    pub(crate) assignment: Option<Assignment>,
    pub(crate) debug: SparseDebugInfo,
    pub(crate) faults: FaultLog,
    pub(crate) attempts: Vec<Assignment>,
}

fn compute_candidate_counts(vars: &[&RandVar], max_domain_size: u64) -> Vec<usize> {
    let n = vars.len().max(1);
    let per_var_budget = (max_domain_size as f64).powf(1.0 / n as f64).max(1.0);

    let sizes: Vec<f64> = vars
        .iter()
        .map(|var| var.domain.size().map(|s| s as f64).unwrap_or(per_var_budget * 8.0))
        .collect();
    let total: f64 = sizes.iter().sum::<f64>().max(1.0);

    sizes
        .iter()
        .map(|&size| {
            let share = per_var_budget * n as f64 * (size / total);
            (share.floor() as usize).clamp(1, MAX_CANDIDATES_PER_VAR)
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn group_backtrack(
    depth: usize,
    group_vars: &[&RandVar],
    candidates: &[Vec<Value>],
    assignment: &mut Assignment,
    constraints: &[&MultiConstraint],
    faults: &mut FaultLog,
    node_budget: &mut usize,
    width_reached: &mut usize,
) -> bool {
    if depth == group_vars.len() {
        return true;
    }

    let var = group_vars[depth];
    let mut attempts = 0usize;
    for candidate in &candidates[depth] {
        if *node_budget == 0 {
            return false;
        }
        if attempts >= GROUP_SEARCH_WIDTH {
            break;
        }
        attempts += 1;
        *width_reached = (*width_reached).max(attempts);
        *node_budget -= 1;

        assignment.set(var.name.clone(), candidate.clone());
        let failed = check_ready_constraints(constraints, assignment, faults);
        if !failed.is_empty() {
            continue;
        }
        if group_backtrack(
            depth + 1,
            group_vars,
            candidates,
            assignment,
            constraints,
            faults,
            node_budget,
            width_reached,
        ) {
            return true;
        }
    }
    false
}

#[allow(clippy::too_many_arguments)]
fn solve_group(
    group_vars: &[&RandVar],
    base_assignment: &Assignment,
    constraints: &[&MultiConstraint],
    rng: &mut RandomSource,
    max_domain_size: u64,
    node_budget: &mut usize,
    max_width_reached: &mut usize,
    widen_count: &mut usize,
    faults: &mut FaultLog,
) -> Option<Assignment> {
    let mut counts = compute_candidate_counts(group_vars, max_domain_size);

    for widen_attempt in 0..=MAX_WIDENERS {
        if widen_attempt > 0 {
            *widen_count += 1;
            for count in counts.iter_mut() {
                *count = (*count * WIDEN_FACTOR).min(MAX_CANDIDATES_PER_VAR);
            }
            log::trace!(
                "sparse: widening group candidate sets (attempt {widen_attempt}/{MAX_WIDENERS})"
            );
        }

        if *node_budget == 0 {
            return None;
        }

        let mut candidates: Vec<Vec<Value>> = group_vars
            .iter()
            .zip(&counts)
            .map(|(var, &count)| {
                if var.length == 0 {
                    var.enumerate_candidates(rng, count, faults)
                        .into_iter()
                        .map(Value::Int)
                        .collect::<Vec<_>>()
                } else {
                    (0..count)
                        .filter_map(|_| {
                            let (value, ok) = var.draw(rng, faults);
                            ok.then_some(value)
                        })
                        .collect::<Vec<_>>()
                }
            })
            .collect();

        for candidate_list in candidates.iter_mut() {
            rng.shuffle(candidate_list);
        }

        let mut assignment = base_assignment.clone();
        let mut width_reached = 0;
        let success = group_backtrack(
            0,
            group_vars,
            &candidates,
            &mut assignment,
            constraints,
            faults,
            node_budget,
            &mut width_reached,
        );
        *max_width_reached = (*max_width_reached).max(width_reached);

        if success {
            return Some(assignment);
        }
        if *node_budget == 0 {
            return None;
        }
    }
    None
}

pub(crate) fn run(ctx: &mut StrategyContext, debug_attempts: bool) -> SparseOutcome {
    let mut faults = FaultLog::default();
    let mut debug = SparseDebugInfo::default();
    let mut attempts = Vec::new();

    let free_vars: Vec<&RandVar> = ctx.free_vars().map(|v| *v).collect();

    if free_vars.is_empty() {
        let assignment = ctx.base_assignment();
        let failed = check_ready_constraints(&ctx.constraints, &assignment, &mut faults);
        debug.deepest_partial_assignment = assignment.clone();
        let result = if failed.is_empty() { Some(assignment) } else { None };
        return SparseOutcome { assignment: result, debug, faults, attempts };
    }

    let mut groups_map: BTreeMap<i64, Vec<&RandVar>> = BTreeMap::new();
    for &var in &free_vars {
        groups_map.entry(var.order).or_default().push(var);
    }
    let groups: Vec<Vec<&RandVar>> = groups_map.into_values().collect();

    let mut node_budget = ctx.max_iterations;
    let mut entry_snapshot: Vec<Assignment> = vec![Assignment::new(); groups.len()];
    let mut retries_left = vec![GROUP_BACKTRACK_ATTEMPTS; groups.len()];
    let mut assignment = ctx.base_assignment();
    let mut group_idx = 0usize;

    let outcome = loop {
        if group_idx == groups.len() {
            break Some(assignment.clone());
        }

        entry_snapshot[group_idx] = assignment.clone();
        debug.groups_attempted += 1;

        let result = solve_group(
            &groups[group_idx],
            &assignment,
            &ctx.constraints,
            ctx.rng,
            ctx.max_domain_size,
            &mut node_budget,
            &mut debug.max_width_reached,
            &mut debug.widen_count,
            &mut faults,
        );

        match result {
            Some(new_assignment) => {
                assignment = new_assignment;
                group_idx += 1;
            }
            None => {
                debug.deepest_partial_assignment = assignment.clone();
                if debug_attempts && attempts.len() < crate::debug_info::DEBUG_ATTEMPT_CAP {
                    attempts.push(assignment.clone());
                }
                if node_budget == 0 || group_idx == 0 || retries_left[group_idx - 1] == 0 {
                    break None;
                }
                retries_left[group_idx - 1] -= 1;
                group_idx -= 1;
                assignment = entry_snapshot[group_idx].clone();
            }
        }
    };

    debug.node_visits = ctx.max_iterations.saturating_sub(node_budget);
    if outcome.is_some() {
        debug.deepest_partial_assignment = assignment;
    }

    SparseOutcome {
        assignment: outcome,
        debug,
        faults,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use fnv::FnvHashMap;

    use super::*;
    use crate::domain::Domain;
    use crate::predicate::NamedListConstraint;

    #[test]
    fn solves_order_dependent_plus_one() {
        let mut x = RandVar::new("x".to_string(), Domain::BitWidth(7));
        x.order = 0;
        let mut y = RandVar::new("y".to_string(), Domain::BitWidth(7));
        y.order = 1;
        let constraint = MultiConstraint {
            name: Some("plus_one".to_string()),
            variables: vec!["x".to_string(), "y".to_string()],
            predicate: Box::new(|values| {
                values[1].as_int().unwrap() == values[0].as_int().unwrap() + 1
            }),
        };
        let fixed = FnvHashMap::default();
        let mut rng = RandomSource::new(2);
        let mut ctx = StrategyContext {
            vars: vec![&x, &y],
            constraints: vec![&constraint],
            fixed: &fixed,
            max_iterations: 2000,
            max_domain_size: 10_000,
            rng: &mut rng,
        };

        let outcome = run(&mut ctx, false);
        let assignment = outcome.assignment.expect("should solve order-dependent constraint");
        let xv = assignment.get("x").unwrap().as_int().unwrap();
        let yv = assignment.get("y").unwrap().as_int().unwrap();
        assert_eq!(yv, xv + 1);
    }

    #[test]
    fn groups_variables_by_order() {
        let mut a = RandVar::new("a".to_string(), Domain::BitWidth(4));
        a.order = 5;
        let mut b = RandVar::new("b".to_string(), Domain::BitWidth(4));
        b.order = 5;
        let mut c = RandVar::new("c".to_string(), Domain::BitWidth(4));
        c.order = 1;

        let fixed = FnvHashMap::default();
        let mut rng = RandomSource::new(0);
        let mut ctx = StrategyContext {
            vars: vec![&a, &b, &c],
            constraints: vec![],
            fixed: &fixed,
            max_iterations: 500,
            max_domain_size: 10_000,
            rng: &mut rng,
        };
        let outcome = run(&mut ctx, false);
        assert!(outcome.assignment.is_some());
        assert_eq!(outcome.debug.groups_attempted, 2);
    }

    #[test]
    fn never_returns_a_list_violating_its_own_list_constraint() {
        let mut xs = RandVar::new("xs".to_string(), Domain::BitWidth(2));
        xs.length = 4;
        xs.list_constraints.push(NamedListConstraint {
            name: Some("unique".to_string()),
            predicate: Box::new(|values| {
                let mut sorted = values.to_vec();
                sorted.sort_unstable();
                sorted.dedup();
                sorted.len() == values.len()
            }),
        });

        let fixed = FnvHashMap::default();
        let mut rng = RandomSource::new(3);
        let mut ctx = StrategyContext {
            vars: vec![&xs],
            constraints: vec![],
            fixed: &fixed,
            max_iterations: 500,
            max_domain_size: 10_000,
            rng: &mut rng,
        };

        for _ in 0..25 {
            let outcome = run(&mut ctx, false);
            if let Some(assignment) = outcome.assignment {
                let list = assignment.get("xs").unwrap().as_list().unwrap();
                let mut sorted = list.to_vec();
                sorted.sort_unstable();
                sorted.dedup();
                assert_eq!(
                    sorted.len(),
                    list.len(),
                    "sparse strategy returned a list violating its own list_constraints: {list:?}"
                );
            }
        }
    }
}
