//! The problem model: the set of variables, multi-variable constraints, solver tuning, and the
//! single `randomize` entry point that drives the solver pipeline.

use fnv::FnvHashMap;

use crate::assignment::Assignment;
use crate::debug_info::RandomizationDebugInfo;
use crate::domain::Domain;
use crate::domain::DomainFn;
use crate::domain::WeightedEntry;
use crate::error::ConfigurationError;
use crate::error::RandomizationError;
use crate::predicate::ListPredicate;
use crate::predicate::MultiConstraint;
use crate::predicate::MultiPredicate;
use crate::predicate::NamedListConstraint;
use crate::predicate::NamedScalarConstraint;
use crate::predicate::ScalarPredicate;
use crate::rand_var::RandVar;
use crate::random::RandomSource;
use crate::solver;
use crate::value::Value;
use crate::var_store::VarStore;

/// Which solver strategies are enabled for a problem. All three are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverFlags {
    pub naive: bool,
    pub sparse: bool,
    pub thorough: bool,
}

impl Default for SolverFlags {
    fn default() -> Self {
        SolverFlags {
            naive: true,
            sparse: true,
            thorough: true,
        }
    }
}

/// Declares a variable's domain, shape, and local constraints before it is added to a problem.
///
/// Mirrors the `{ bits: W } | { domain: D } | { fn: F, args: A } | { length: N, ... }` shape of a
/// declared variable; constructed with one of the shape constructors and then refined with the
/// `with_*` builders.
pub struct VarSpec {
    pub(crate) domain: Domain,
    pub(crate) length: usize,
    pub(crate) scalar_constraints: Vec<NamedScalarConstraint>,
    pub(crate) list_constraints: Vec<NamedListConstraint>,
    pub(crate) order: i64,
    pub(crate) initial: Option<Value>,
}

impl VarSpec {
    pub fn bits(width: u32) -> Self {
        VarSpec::from_domain(Domain::BitWidth(width))
    }

    pub fn enumerated(values: Vec<i64>) -> Self {
        VarSpec::from_domain(Domain::Enumerated(values))
    }

    pub fn weighted(entries: Vec<WeightedEntry>) -> Self {
        VarSpec::from_domain(Domain::Weighted(entries))
    }

    pub fn function(f: DomainFn, args: Vec<Value>) -> Self {
        VarSpec::from_domain(Domain::Function(f, args))
    }

    fn from_domain(domain: Domain) -> Self {
        VarSpec {
            domain,
            length: 0,
            scalar_constraints: Vec::new(),
            list_constraints: Vec::new(),
            order: 0,
            initial: None,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn with_initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    pub fn with_scalar_constraint(
        mut self,
        name: Option<&str>,
        predicate: ScalarPredicate,
    ) -> Self {
        self.scalar_constraints.push(NamedScalarConstraint {
            name: name.map(str::to_string),
            predicate,
        });
        self
    }

    pub fn with_list_constraint(mut self, name: Option<&str>, predicate: ListPredicate) -> Self {
        self.list_constraints.push(NamedListConstraint {
            name: name.map(str::to_string),
            predicate,
        });
        self
    }
}

/// Per-call overrides passed to [`MultiVarProblem::randomize`].
#[derive(Default)]
pub struct RandomizeOptions {
    pub with_constraints: Vec<MultiConstraint>,
    pub with_values: FnvHashMap<String, Value>,
    pub debug: bool,
}

/// The set of variables and constraints for one randomization problem, plus solver tuning.
///
/// Owns the [`RandomSource`] that every draw in its lifetime flows through, per the single
/// shared random source contract.
pub struct MultiVarProblem {
    vars: VarStore,
    multi_constraints: Vec<MultiConstraint>,
    max_iterations: usize,
    max_domain_size: u64,
    solver_flags: SolverFlags,
    rng: RandomSource,
    last_result: Option<Assignment>,
    pre_randomize_hook: Option<Box<dyn FnMut()>>,
    post_randomize_hook: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for MultiVarProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiVarProblem")
            .field("vars", &self.vars)
            .field("max_iterations", &self.max_iterations)
            .field("max_domain_size", &self.max_domain_size)
            .field("solver_flags", &self.solver_flags)
            .field("last_result", &self.last_result)
            .finish_non_exhaustive()
    }
}

impl MultiVarProblem {
    /// Creates an empty problem with its own random source, seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        MultiVarProblem::with_random_source(RandomSource::new(seed))
    }

    /// Creates an empty problem bound to a caller-owned random source, for callers that want to
    /// share one generator across multiple problems or an enclosing container object.
    pub fn with_random_source(rng: RandomSource) -> Self {
        MultiVarProblem {
            vars: VarStore::new(),
            multi_constraints: Vec::new(),
            max_iterations: 1000,
            max_domain_size: 1_000_000,
            solver_flags: SolverFlags::default(),
            rng,
            last_result: None,
            pre_randomize_hook: None,
            post_randomize_hook: None,
        }
    }

    /// Adds a variable to the problem. Fails immediately if the name is already taken, or if
    /// list constraints were declared on a scalar (`length == 0`) variable.
    pub fn add_var(&mut self, name: &str, spec: VarSpec) -> Result<(), ConfigurationError> {
        if self.vars.contains(name) {
            return Err(ConfigurationError::DuplicateVariable(name.to_string()));
        }
        if spec.length == 0 && !spec.list_constraints.is_empty() {
            return Err(ConfigurationError::ListConstraintOnScalar {
                constraint: spec
                    .list_constraints
                    .first()
                    .and_then(|c| c.name.clone())
                    .unwrap_or_else(|| "<anonymous>".to_string()),
                variable: name.to_string(),
            });
        }

        let mut var = RandVar::new(name.to_string(), spec.domain);
        var.length = spec.length;
        var.scalar_constraints = spec.scalar_constraints;
        var.list_constraints = spec.list_constraints;
        var.order = spec.order;
        var.initial = spec.initial;
        let inserted = self.vars.insert(var);
        debug_assert!(inserted, "duplicate check above should have caught this");
        Ok(())
    }

    /// Adds a multi-variable (or single-variable, post-hoc) constraint. Fails immediately if any
    /// referenced variable is unknown.
    pub fn add_constraint(
        &mut self,
        name: Option<&str>,
        variables: &[&str],
        predicate: MultiPredicate,
    ) -> Result<(), ConfigurationError> {
        for &variable in variables {
            if !self.vars.contains(variable) {
                return Err(ConfigurationError::UnknownVariable {
                    constraint: name.unwrap_or("<anonymous>").to_string(),
                    variable: variable.to_string(),
                });
            }
        }
        self.multi_constraints.push(MultiConstraint {
            name: name.map(str::to_string),
            variables: variables.iter().map(|s| s.to_string()).collect(),
            predicate,
        });
        Ok(())
    }

    pub fn set_solver_mode(&mut self, flags: SolverFlags) {
        self.solver_flags = flags;
    }

    pub fn set_tuning(
        &mut self,
        max_iterations: Option<usize>,
        max_domain_size: Option<u64>,
    ) -> Result<(), ConfigurationError> {
        if let Some(value) = max_iterations {
            if value == 0 {
                return Err(ConfigurationError::InvalidTuning {
                    parameter: "max_iterations".to_string(),
                    value: value as i64,
                });
            }
            self.max_iterations = value;
        }
        if let Some(value) = max_domain_size {
            if value == 0 {
                return Err(ConfigurationError::InvalidTuning {
                    parameter: "max_domain_size".to_string(),
                    value: value as i64,
                });
            }
            self.max_domain_size = value;
        }
        Ok(())
    }

    pub fn set_pre_randomize_hook(&mut self, hook: Box<dyn FnMut()>) {
        self.pre_randomize_hook = Some(hook);
    }

    pub fn set_post_randomize_hook(&mut self, hook: Box<dyn FnMut()>) {
        self.post_randomize_hook = Some(hook);
    }

    /// Computes a dependency-inferred rank from the multi-constraint variable sets and merges it
    /// with each variable's explicit `order` hint, as a tie-breaker. This is an optional
    /// refinement, never called automatically: it nudges the existing `order` field rather than
    /// replacing it. Variables that participate in more multi-variable constraints are considered
    /// more tightly coupled and are nudged earlier.
    pub fn infer_order_from_constraints(&mut self) {
        let mut degree: FnvHashMap<String, i64> = FnvHashMap::default();
        for constraint in &self.multi_constraints {
            if constraint.variables.len() < 2 {
                continue;
            }
            for variable in &constraint.variables {
                *degree.entry(variable.clone()).or_insert(0) += 1;
            }
        }
        for var in self.vars.iter_mut_for_ordering() {
            let inferred = degree.get(&var.name).copied().unwrap_or(0);
            // Higher degree (more coupled) sorts earlier; encode as a small negative nudge so it
            // only breaks ties within the same explicit order, never overriding an explicit hint.
            var.order = var.order.saturating_mul(1000) - inferred;
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn max_domain_size(&self) -> u64 {
        self.max_domain_size
    }

    pub fn solver_flags(&self) -> SolverFlags {
        self.solver_flags
    }

    pub fn vars(&self) -> &VarStore {
        &self.vars
    }

    pub fn multi_constraints(&self) -> &[MultiConstraint] {
        &self.multi_constraints
    }

    pub fn rng_mut(&mut self) -> &mut RandomSource {
        &mut self.rng
    }

    /// Splits the problem into its variable store, its standing constraints, and the random
    /// source, as three independently-borrowed references. The solver needs to hold the first
    /// two immutably for the whole of a `solve` call while repeatedly reborrowing the random
    /// source mutably; borrowing each field through its own accessor would tie all three to one
    /// conflicting borrow of `self`.
    pub(crate) fn solver_parts(&mut self) -> (&VarStore, &[MultiConstraint], &mut RandomSource) {
        (&self.vars, &self.multi_constraints, &mut self.rng)
    }

    /// The last successful assignment, if any `randomize` call has succeeded.
    pub fn get_results(&self) -> Option<&Assignment> {
        self.last_result.as_ref()
    }

    /// Runs the solver pipeline: naive, then sparse, then thorough, in that fixed order, each
    /// bounded by the problem's tuning parameters, falling through on failure.
    ///
    /// `with_constraints` and `with_values` apply only for the duration of this call; they never
    /// mutate the problem, so a subsequent call with no overrides never re-applies them.
    pub fn randomize(
        &mut self,
        options: RandomizeOptions,
    ) -> Result<Assignment, RandomizationError> {
        if let Some(hook) = self.pre_randomize_hook.as_mut() {
            hook();
        }

        let result = solver::solve(self, &options.with_constraints, &options.with_values, options.debug);

        match result {
            Ok(assignment) => {
                self.last_result = Some(assignment.clone());
                if let Some(hook) = self.post_randomize_hook.as_mut() {
                    hook();
                }
                Ok(assignment)
            }
            Err(debug_info) => Err(RandomizationError::new(debug_info)),
        }
    }
}
