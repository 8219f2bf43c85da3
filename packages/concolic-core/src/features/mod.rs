//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure business logic (no external dependencies)
//! - infrastructure/ - Solver-facing implementations
//! - application/ - Use cases

// Expression trees and the concolic value wrapper (leaf component)
pub mod expression;

// Predicate lowering and the width/bound counterexample search
pub mod search;
