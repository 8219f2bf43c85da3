//! Counterexample Search
//!
//! Finds inputs that satisfy a path condition but falsify a branch predicate.
//!
//! Bit-vector models can be spurious: an overflow at the solver's width may
//! satisfy a constraint that native integers do not. The search therefore
//! replays every model natively and, on disagreement, retries at a wider bit
//! width.
//!
//! ```text
//! for W in initial_width..=max_width step width_step:     (escalation)
//!     scope { assertions ∧ ¬query at W
//!         bound = 2^k - 1
//!         while bound < 2^W and min(bound, 2^(W-1) - 1) grows:  (widening)
//!             scope { ∀v: v ≤ bound ∧ v > -bound + 1; check }
//!             unsat → bound = 2·bound + 1
//!     }
//!     unsat   → NoCounterexample
//!     unknown → Inconclusive
//!     sat     → replay natively: agree → Counterexample, else next W
//! ```
//!
//! # Usage
//! ```text
//! use concolic_core::{CounterexampleSearch, Predicate, SymbolicValue};
//!
//! let x = SymbolicValue::variable_with_value("x", 10);
//! let query = Predicate::holds(x.greater_than(5)?);
//!
//! let mut search = CounterexampleSearch::bounded();
//! let outcome = search.find_counterexample(&[], &query)?;
//! assert_eq!(outcome.model().and_then(|m| m.get("x")), Some(&0));
//! ```

use crate::config::{ConcolicConfig, SearchConfig};
use crate::errors::{ConcolicError, Result};
use crate::features::expression::SymbolicValue;
use crate::features::search::domain::formula::max_signed;
use crate::features::search::domain::{
    BvCmp, BvTerm, CounterexampleModel, Formula, Predicate, SearchOutcome, SearchStats,
};
use crate::features::search::infrastructure::{
    model_agrees, BoundedSolver, CheckResult, Lowering, SmtSolver, SolverScope,
};
use std::iter;

#[cfg(feature = "z3")]
use crate::features::search::infrastructure::Z3Solver;
use tracing::{debug, error, info, warn};

/// Result of the bound-widening loop at one width
#[derive(Debug)]
enum WideningResult {
    Sat(CounterexampleModel),
    Unsat,
    Unknown,
}

/// Width-escalating counterexample finder over a solver backend
pub struct CounterexampleSearch<S: SmtSolver> {
    solver: S,
    config: SearchConfig,
    stats: SearchStats,
}

impl CounterexampleSearch<BoundedSolver> {
    /// Search backed by the pure-Rust bounded solver, default budgets
    ///
    /// UNSAT is proven only when interval propagation over linear atoms
    /// empties a variable or the candidate space is enumerated in full;
    /// other UNSAT queries end as `Inconclusive`. Build with `--features z3`
    /// and use [`CounterexampleSearch::z3`] for a complete decision procedure.
    pub fn bounded() -> Self {
        Self::new(BoundedSolver::new())
    }

    /// Search backed by the bounded solver, budgets from a loaded config file
    pub fn bounded_from_config(config: &ConcolicConfig) -> Result<Self> {
        config.validate()?;
        Self::with_config(
            BoundedSolver::with_config(config.bounded_solver.clone()),
            config.search.clone(),
        )
    }
}

#[cfg(feature = "z3")]
impl<'ctx> CounterexampleSearch<Z3Solver<'ctx>> {
    /// Search backed by Z3 on `ctx`, default budgets
    pub fn z3(ctx: &'ctx z3::Context) -> Self {
        Self::new(Z3Solver::new(ctx))
    }
}

impl<S: SmtSolver> CounterexampleSearch<S> {
    /// Create new search with default budgets
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            config: SearchConfig::default(),
            stats: SearchStats::default(),
        }
    }

    /// Create new search with custom budgets
    pub fn with_config(solver: S, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            solver,
            config,
            stats: SearchStats::default(),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Get statistics
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn into_solver(self) -> S {
        self.solver
    }

    /// Search for an assignment satisfying `assertions` and falsifying `query`
    ///
    /// # Errors
    ///
    /// - `DuplicateVariable` if two distinct variables share a name
    /// - solver errors (undeclared names, unbalanced scopes)
    /// - `MissingModelValue` if a SAT model omits a variable
    pub fn find_counterexample(
        &mut self,
        assertions: &[Predicate],
        query: &Predicate,
    ) -> Result<SearchOutcome> {
        let Self {
            solver,
            config,
            stats,
        } = self;
        stats.queries += 1;

        let negated = query.negated();
        debug!(
            solver = solver.name(),
            assertions = assertions.len(),
            %query,
            "counterexample search started"
        );

        for width in config.widths() {
            stats.width_rounds += 1;

            let mut width_scope = SolverScope::enter(&mut *solver);
            let mut lowering = Lowering::new(width);
            let formulas = assertions
                .iter()
                .chain(iter::once(&negated))
                .map(|predicate| lowering.lower_predicate(predicate))
                .collect::<Result<Vec<_>>>()?;

            for var in lowering.variables() {
                width_scope.declare_bitvec(var.name(), width)?;
            }
            for formula in &formulas {
                debug!(width, %formula, "assert");
                width_scope.assert(formula)?;
            }

            let result = widen_bounds(
                &mut *width_scope,
                lowering.variables(),
                width,
                config,
                stats,
            )?;
            width_scope.close()?;

            match result {
                WideningResult::Unsat => {
                    warn!(width, %query, "UNSAT: no counterexample");
                    stats.unsat_results += 1;
                    return Ok(SearchOutcome::NoCounterexample { width });
                }
                WideningResult::Unknown => {
                    error!(width, solver = solver.name(), %query, "UNKNOWN: solver gave up");
                    stats.unknown_results += 1;
                    return Ok(SearchOutcome::Inconclusive { width });
                }
                WideningResult::Sat(model) => {
                    if model_agrees(assertions, query, &model)? {
                        debug!(width, ?model, "counterexample found");
                        stats.counterexamples += 1;
                        return Ok(SearchOutcome::Counterexample { model, width });
                    }
                    stats.escalations += 1;
                    info!(
                        width,
                        next_width = width + config.width_step,
                        ?model,
                        "model disagrees with native semantics, escalating width"
                    );
                }
            }
        }

        warn!(max_width = config.max_width, %query, "width budget exhausted");
        Ok(SearchOutcome::BudgetExhausted {
            max_width: config.max_width,
        })
    }
}

/// Range constraint `-bound + 1 < v ≤ bound` for every variable
fn range_constraint(variables: &[SymbolicValue], bound: i128, width: u32) -> Formula {
    let upper = BvTerm::constant(bound, width);
    let lower = BvTerm::constant(1 - bound, width);
    Formula::And(
        variables
            .iter()
            .flat_map(|var| {
                let v = BvTerm::var(var.name(), width);
                [
                    Formula::compare(BvCmp::Sle, v.clone(), upper.clone()),
                    Formula::compare(BvCmp::Sgt, v, lower.clone()),
                ]
            })
            .collect(),
    )
}

/// Bound widening at one width; the caller's scope holds the constraints
fn widen_bounds<S: SmtSolver + ?Sized>(
    solver: &mut S,
    variables: &[SymbolicValue],
    width: u32,
    config: &SearchConfig,
    stats: &mut SearchStats,
) -> Result<WideningResult> {
    // None at W = 128: every u128 bound is below 2^128
    let limit = 1u128.checked_shl(width);
    let mut bound = config.initial_bound();
    let mut previous = None;

    loop {
        if limit.is_some_and(|limit| bound >= limit) {
            return Ok(WideningResult::Unsat);
        }

        let clamped = i128::try_from(bound)
            .unwrap_or(i128::MAX)
            .min(max_signed(width));
        // the clamped range already covers every value at this width
        if previous == Some(clamped) {
            return Ok(WideningResult::Unsat);
        }
        previous = Some(clamped);

        let mut scope = SolverScope::enter(&mut *solver);
        scope.assert(&range_constraint(variables, clamped, width))?;

        stats.solver_checks += 1;
        let result = scope.check();
        debug!(width, bound = %bound, %result, "bound round");

        match result {
            CheckResult::Sat => {
                let model = read_model(&mut *scope, variables, width)?;
                scope.close()?;
                return Ok(WideningResult::Sat(model));
            }
            CheckResult::Unknown => {
                scope.close()?;
                return Ok(WideningResult::Unknown);
            }
            CheckResult::Unsat => {
                scope.close()?;
                match bound.checked_mul(2).and_then(|b| b.checked_add(1)) {
                    Some(next) => bound = next,
                    None => return Ok(WideningResult::Unsat),
                }
            }
        }
    }
}

/// Signed value of every variable under the solver's current model
fn read_model<S: SmtSolver + ?Sized>(
    solver: &mut S,
    variables: &[SymbolicValue],
    width: u32,
) -> Result<CounterexampleModel> {
    let model = solver
        .get_model()
        .ok_or_else(|| ConcolicError::solver("SAT result without a model"))?;

    variables
        .iter()
        .map(|var| {
            solver
                .eval(&model, &BvTerm::var(var.name(), width))
                .map(|value| (var.name().to_string(), value))
                .ok_or_else(|| ConcolicError::MissingModelValue {
                    name: var.name().to_string(),
                })
        })
        .collect()
}
