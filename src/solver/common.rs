//! Helpers shared by all three strategies: constraint readiness, evaluation, and the read-only
//! view of a problem a strategy run needs.

use fnv::FnvHashMap;

use crate::assignment::Assignment;
use crate::debug_info::FailedPredicateRecord;
use crate::predicate::eval_multi;
use crate::predicate::FaultLog;
use crate::predicate::MultiConstraint;
use crate::rand_var::RandVar;
use crate::random::RandomSource;
use crate::value::Value;

/// The read-only problem state a strategy needs, plus the one mutable handle (the random
/// source) every draw flows through.
pub(crate) struct StrategyContext<'a> {
    pub(crate) vars: Vec<&'a RandVar>,
    pub(crate) constraints: Vec<&'a MultiConstraint>,
    pub(crate) fixed: &'a FnvHashMap<String, Value>,
    pub(crate) max_iterations: usize,
    pub(crate) max_domain_size: u64,
    pub(crate) rng: &'a mut RandomSource,
}

impl<'a> StrategyContext<'a> {
    /// Non-fixed variables, in insertion order — these are the ones a strategy must actually
    /// decide values for.
    pub(crate) fn free_vars(&self) -> impl Iterator<Item = &&'a RandVar> {
        self.vars.iter().filter(|v| !self.fixed.contains_key(&v.name))
    }

    /// Builds the fixed portion of an assignment, to seed every attempt.
    pub(crate) fn base_assignment(&self) -> Assignment {
        let mut assignment = Assignment::new();
        for (name, value) in self.fixed.iter() {
            assignment.set(name.clone(), value.clone());
        }
        assignment
    }
}

/// Whether every variable a constraint reads is present in `assignment`.
pub(crate) fn constraint_ready(constraint: &MultiConstraint, assignment: &Assignment) -> bool {
    constraint.variables.iter().all(|name| assignment.contains(name))
}

fn gather_values(constraint: &MultiConstraint, assignment: &Assignment) -> Vec<Value> {
    constraint
        .variables
        .iter()
        .map(|name| {
            assignment
                .get(name)
                .cloned()
                .expect("constraint_ready must be checked before gathering values")
        })
        .collect()
}

/// Evaluates every constraint whose variables are all present in `assignment`; returns a record
/// for each one that failed (empty means every ready constraint passed).
pub(crate) fn check_ready_constraints(
    constraints: &[&MultiConstraint],
    assignment: &Assignment,
    faults: &mut FaultLog,
) -> Vec<FailedPredicateRecord> {
    let mut failed = Vec::new();
    for constraint in constraints {
        if !constraint_ready(constraint, assignment) {
            continue;
        }
        let values = gather_values(constraint, assignment);
        if !eval_multi(constraint, &values, faults) {
            failed.push(FailedPredicateRecord {
                constraint_name: constraint.name.clone(),
                variables: constraint.variables.clone(),
            });
        }
    }
    failed
}
