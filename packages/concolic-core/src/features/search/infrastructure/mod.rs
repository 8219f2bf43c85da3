//! Search Infrastructure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Search Infrastructure                   │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐     │
//! │  │  Lowering   │──▶│   Solvers   │──▶│ Validation  │     │
//! │  │ (pred → BV) │   │ (SAT/model) │   │  (native)   │     │
//! │  └─────────────┘   └──────┬──────┘   └─────────────┘     │
//! │                           │                              │
//! │                   ┌───────▼───────┐                      │
//! │                   │  SolverScope  │                      │
//! │                   │   (push/pop)  │                      │
//! │                   └───────────────┘                      │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `lowering` - Predicates → fixed-width formulas, variable identity checks
//! - `solvers::bounded` - Pure-Rust bounded model finder
//! - `solvers::z3_backend` - Z3 backend (optional, feature-gated)
//! - `solvers::bitvec` - Exact SMT-LIB bit-vector semantics
//! - `scope` - RAII push/pop guard
//! - `validation` - Native replay of solver models

pub mod lowering;
pub mod scope;
pub mod solvers;
pub mod validation;

pub use lowering::Lowering;
pub use scope::SolverScope;
pub use solvers::{BoundedModel, BoundedSolver, CheckResult, SmtSolver};
pub use validation::model_agrees;

#[cfg(feature = "z3")]
pub use solvers::Z3Solver;
