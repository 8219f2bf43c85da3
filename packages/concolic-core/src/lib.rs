/*
 * Concolic Core - symbolic values and counterexample search
 *
 * Feature-First Hexagonal Architecture:
 * - features/expression : Expression trees + concolic value wrapper
 * - features/search     : Predicate lowering, solver backends, width/bound search
 * - config/             : Search budgets (YAML v1)
 *
 * Single-threaded by construction: values are Rc-shared and the engine owns
 * its solver exclusively.
 */

// Crate-level lint configuration
#![allow(clippy::should_implement_trait)] // add/sub/mul are fallible, not std::ops
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Feature modules (expression model, counterexample search)
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{BoundedSolverConfig, ConcolicConfig, ConfigError, SearchConfig};
pub use errors::{ConcolicError, Result};
pub use features::expression::{Expression, Operand, Operator, SymbolicValue};
pub use features::search::{
    BoundedSolver, CheckResult, CounterexampleModel, CounterexampleSearch, Predicate,
    SearchOutcome, SearchStats, SmtSolver,
};

#[cfg(feature = "z3")]
pub use features::search::Z3Solver;
