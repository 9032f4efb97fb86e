//! The per-variable model: domain, shape, local constraints, and the single `draw` operation.

use std::collections::HashSet;

use crate::domain::Domain;
use crate::predicate::eval_list;
use crate::predicate::eval_scalar;
use crate::predicate::FaultLog;
use crate::predicate::NamedListConstraint;
use crate::predicate::NamedScalarConstraint;
use crate::random::RandomSource;
use crate::value::Value;

/// Bounded number of retries `RandVar::draw` will attempt against its own scalar constraints
/// before giving up and returning the last attempt. The solver layer decides whether that last
/// attempt is acceptable.
const SCALAR_RETRY_LIMIT: usize = 10;

/// Bounded number of retries against list-level constraints.
const LIST_RETRY_LIMIT: usize = 10;

/// How many extra candidates to sample, relative to the requested count, when enumerating a
/// domain that must be sampled-and-filtered rather than enumerated outright.
const ENUMERATION_OVERSAMPLE_FACTOR: usize = 8;

/// Bounded number of oversampling rounds attempted before `enumerate_candidates` gives up and
/// returns however many distinct, constraint-satisfying candidates it found.
const ENUMERATION_OVERSAMPLE_ROUNDS: usize = 4;

/// A single random variable: name, domain, shape, local constraints, ordering hint and initial
/// value.
#[derive(Debug)]
pub struct RandVar {
    pub name: String,
    pub domain: Domain,
    /// `0` for a scalar variable, `N > 0` for a list of `N` elements.
    pub length: usize,
    pub scalar_constraints: Vec<NamedScalarConstraint>,
    pub list_constraints: Vec<NamedListConstraint>,
    pub order: i64,
    pub initial: Option<Value>,
}

impl RandVar {
    pub fn new(name: String, domain: Domain) -> Self {
        RandVar {
            name,
            domain,
            length: 0,
            scalar_constraints: Vec::new(),
            list_constraints: Vec::new(),
            order: 0,
            initial: None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        self.length == 0
    }

    /// Draws one scalar value, retrying up to [`SCALAR_RETRY_LIMIT`] times against
    /// `scalar_constraints`. Returns the value and whether every scalar constraint held for it.
    fn draw_scalar(&self, rng: &mut RandomSource, faults: &mut FaultLog) -> (i64, bool) {
        let mut last = self.domain.sample(rng).as_int().unwrap_or_default();
        for attempt in 0..=SCALAR_RETRY_LIMIT {
            let candidate = if attempt == 0 {
                last
            } else {
                self.domain.sample(rng).as_int().unwrap_or_default()
            };
            last = candidate;
            let satisfied = self
                .scalar_constraints
                .iter()
                .all(|c| eval_scalar(c, candidate, faults));
            if satisfied {
                return (candidate, true);
            }
        }
        (last, self.scalar_constraints.is_empty())
    }

    /// Draws one complete value for this variable (scalar, or a list of `length` scalar draws),
    /// honoring local constraints on a best-effort basis.
    ///
    /// Returns the drawn value and whether all of its local constraints (scalar, and list when
    /// applicable) were satisfied by the returned value.
    pub fn draw(&self, rng: &mut RandomSource, faults: &mut FaultLog) -> (Value, bool) {
        if self.length == 0 {
            let (value, ok) = self.draw_scalar(rng, faults);
            return (Value::Int(value), ok);
        }

        let mut last_list = Vec::with_capacity(self.length);
        for _ in 0..=LIST_RETRY_LIMIT {
            let mut list = Vec::with_capacity(self.length);
            let mut scalars_ok = true;
            for _ in 0..self.length {
                let (value, ok) = self.draw_scalar(rng, faults);
                scalars_ok &= ok;
                list.push(value);
            }
            let list_ok = self
                .list_constraints
                .iter()
                .all(|c| eval_list(c, &list, faults));

            last_list = list;
            if list_ok && scalars_ok {
                return (Value::List(last_list), true);
            }
        }
        (Value::List(last_list), false)
    }

    /// Requests up to `k` values drawn without repetition from this variable's scalar domain,
    /// satisfying all scalar constraints. Only meaningful for scalar variables; used by the
    /// sparse and thorough strategies to build an enumerated candidate set.
    ///
    /// For domains with `size() <= k`, this is a full (filtered) enumeration. For larger or
    /// infinite (function) domains, `k` candidates are sampled and filtered; a function domain
    /// that never produces an integer value yields an empty candidate set (it cannot be
    /// enumerated at all).
    pub fn enumerate_candidates(
        &self,
        rng: &mut RandomSource,
        k: usize,
        faults: &mut FaultLog,
    ) -> Vec<i64> {
        let accepts = |value: i64, faults: &mut FaultLog| {
            self.scalar_constraints
                .iter()
                .all(|c| eval_scalar(c, value, faults))
        };

        if self.domain.is_fully_enumerable() {
            let mut all = self.domain.enumerate_all();
            all.retain(|&v| accepts(v, faults));
            all.truncate(k.max(1));
            return all;
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for _ in 0..ENUMERATION_OVERSAMPLE_ROUNDS {
            if out.len() >= k {
                break;
            }
            let to_sample = (k - out.len()) * ENUMERATION_OVERSAMPLE_FACTOR;
            for _ in 0..to_sample.max(1) {
                let Some(value) = self.domain.sample(rng).as_int() else {
                    continue;
                };
                if seen.insert(value) && accepts(value, faults) {
                    out.push(value);
                    if out.len() >= k {
                        break;
                    }
                }
            }
        }
        out
    }
}
