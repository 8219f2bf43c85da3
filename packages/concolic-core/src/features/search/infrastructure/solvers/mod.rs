//! SMT Solver Implementations
//!
//! Solver backends for fixed-width bit-vector formulas:
//!
//! 1. **BoundedSolver**: Pure-Rust bounded model finder (always available)
//! 2. **Z3Solver**: Full SMT solver (optional, feature-gated)

use crate::errors::Result;
use crate::features::search::domain::{BvTerm, Formula};
use std::fmt;

pub mod bitvec;
pub mod bounded;

#[cfg(feature = "z3")]
pub mod z3_backend;

pub use bounded::{BoundedModel, BoundedSolver};

#[cfg(feature = "z3")]
pub use z3_backend::Z3Solver;

/// Incremental bit-vector solver capability
///
/// Declarations and assertions made after `push` are discarded by the
/// matching `pop`.
pub trait SmtSolver {
    /// Satisfying assignment handed out by `get_model`
    type Model;

    /// Name of this solver
    fn name(&self) -> &'static str;

    /// Declare a `width`-bit variable in the current scope
    ///
    /// # Errors
    ///
    /// `DuplicateVariable` if `name` is already declared in an open scope.
    fn declare_bitvec(&mut self, name: &str, width: u32) -> Result<()>;

    /// Assert a formula in the current scope
    ///
    /// # Errors
    ///
    /// `UndeclaredVariable` if the formula mentions an undeclared name.
    fn assert(&mut self, formula: &Formula) -> Result<()>;

    /// Open a scope
    fn push(&mut self);

    /// Discard the innermost scope
    ///
    /// # Errors
    ///
    /// `UnbalancedScope` at depth 0.
    fn pop(&mut self) -> Result<()>;

    /// Number of open scopes
    fn depth(&self) -> usize;

    /// Decide the conjunction of all live assertions
    fn check(&mut self) -> CheckResult;

    /// Model of the last `Sat` check
    fn get_model(&mut self) -> Option<Self::Model>;

    /// Signed value of `term` under `model`
    fn eval(&self, model: &Self::Model, term: &BvTerm) -> Option<i128>;
}

/// Solver verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    /// Satisfiable
    Sat,

    /// Unsatisfiable (contradiction)
    Unsat,

    /// Unknown (timeout, too complex, unsupported)
    Unknown,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckResult::Sat => "sat",
            CheckResult::Unsat => "unsat",
            CheckResult::Unknown => "unknown",
        })
    }
}
