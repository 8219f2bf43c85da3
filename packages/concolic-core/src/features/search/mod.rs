//! Counterexample Search Module
//!
//! Lowers path conditions to fixed-width bit-vector formulas and searches for
//! inputs that keep the path feasible while flipping one branch.
//!
//! ## Features
//!
//! - **Predicate Lowering**: Symbolic values → SMT-LIB style bit-vector formulas
//! - **Bounded Model Finder**: Pure-Rust solver, no Z3 required
//! - **Z3 Backend**: Optional, `--features z3`
//! - **Width Escalation**: Spurious overflow models retried at wider widths
//!
//! ## Architecture
//!
//! ```text
//! search
//! ├── domain/               # Domain models
//! │   ├── predicate         # (value, expected) branch outcomes
//! │   ├── formula           # BvTerm / Formula IR
//! │   └── outcome           # SearchOutcome, CounterexampleModel, SearchStats
//! ├── infrastructure/       # Implementation
//! │   ├── lowering          # Predicate → Formula
//! │   ├── solvers           # SmtSolver trait, bounded + z3 backends
//! │   ├── scope             # RAII push/pop
//! │   └── validation        # Native replay of models
//! └── application/
//!     └── counterexample_search
//! ```
//!
//! ## Usage
//!
//! ```text
//! use concolic_core::features::search::{CounterexampleSearch, Predicate};
//!
//! let x = SymbolicValue::variable_with_value("x", 3);
//! let assertions = vec![Predicate::holds(x.greater_than(0)?)];
//! let query = Predicate::holds(x.add(&x)?.greater_than(100)?);
//!
//! let mut search = CounterexampleSearch::bounded();
//! match search.find_counterexample(&assertions, &query)? {
//!     SearchOutcome::Counterexample { model, width } => println!("{:?} @ {}", model, width),
//!     other => println!("{:?}", other),
//! }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::CounterexampleSearch;
pub use domain::{
    BvCmp, BvOp, BvTerm, CounterexampleModel, Formula, Predicate, SearchOutcome, SearchStats,
};
pub use infrastructure::{
    model_agrees, BoundedModel, BoundedSolver, CheckResult, Lowering, SmtSolver, SolverScope,
};

#[cfg(feature = "z3")]
pub use infrastructure::Z3Solver;
