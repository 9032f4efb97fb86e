//! Predicate types and the fault-tolerant evaluation wrapper.
//!
//! Predicates are opaque: the engine cannot reason about them symbolically, it can only call
//! them. A predicate that panics during evaluation is treated the same way a predicate that
//! returns `false` is — a single flaky constraint must not abort an otherwise solvable problem.
//! The fault is still recorded, via [`FaultLog`], so it surfaces in debug info.

use crate::value::Value;

/// A predicate over a single candidate scalar value.
pub type ScalarPredicate = Box<dyn Fn(i64) -> bool>;

/// A predicate over an entire list value.
pub type ListPredicate = Box<dyn Fn(&[i64]) -> bool>;

/// A predicate over a tuple of named variables' current values, in the order the constraint
/// declared them.
pub type MultiPredicate = Box<dyn Fn(&[Value]) -> bool>;

/// A named scalar constraint attached to a [`crate::rand_var::RandVar`].
pub struct NamedScalarConstraint {
    pub name: Option<String>,
    pub predicate: ScalarPredicate,
}

/// A named list constraint attached to a [`crate::rand_var::RandVar`].
pub struct NamedListConstraint {
    pub name: Option<String>,
    pub predicate: ListPredicate,
}

/// A multi-variable constraint: a predicate plus the tuple of variable names it reads.
pub struct MultiConstraint {
    pub name: Option<String>,
    pub variables: Vec<String>,
    pub predicate: MultiPredicate,
}

/// One recorded predicate fault (a panic caught during evaluation).
#[derive(Debug, Clone)]
pub struct PredicateFault {
    pub constraint_name: Option<String>,
    pub message: String,
}

/// Accumulates faults raised by user predicates during a single `randomize` call.
#[derive(Debug, Default)]
pub struct FaultLog {
    faults: Vec<PredicateFault>,
}

impl FaultLog {
    pub fn record(&mut self, constraint_name: Option<String>, message: String) {
        self.faults.push(PredicateFault {
            constraint_name,
            message,
        });
    }

    pub fn faults(&self) -> &[PredicateFault] {
        &self.faults
    }

    pub fn into_faults(self) -> Vec<PredicateFault> {
        self.faults
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "predicate panicked with a non-string payload".to_string()
    }
}

/// Evaluates a scalar constraint, converting a panic into `false` plus a fault record.
pub fn eval_scalar(
    constraint: &NamedScalarConstraint,
    value: i64,
    faults: &mut FaultLog,
) -> bool {
    let predicate = &constraint.predicate;
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| predicate(value))) {
        Ok(result) => result,
        Err(payload) => {
            faults.record(constraint.name.clone(), panic_message(payload));
            false
        }
    }
}

/// Evaluates a list constraint, converting a panic into `false` plus a fault record.
pub fn eval_list(constraint: &NamedListConstraint, values: &[i64], faults: &mut FaultLog) -> bool {
    let predicate = &constraint.predicate;
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| predicate(values))) {
        Ok(result) => result,
        Err(payload) => {
            faults.record(constraint.name.clone(), panic_message(payload));
            false
        }
    }
}

/// Evaluates a multi-variable constraint, converting a panic into `false` plus a fault record.
pub fn eval_multi(constraint: &MultiConstraint, values: &[Value], faults: &mut FaultLog) -> bool {
    let predicate = &constraint.predicate;
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| predicate(values))) {
        Ok(result) => result,
        Err(payload) => {
            faults.record(constraint.name.clone(), panic_message(payload));
            false
        }
    }
}
