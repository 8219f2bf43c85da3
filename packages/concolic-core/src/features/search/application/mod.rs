//! Application layer for Counterexample Search
//!
//! - **CounterexampleSearch**: width escalation + bound widening over any
//!   [`SmtSolver`](crate::features::search::infrastructure::SmtSolver)

pub mod counterexample_search;

pub use counterexample_search::CounterexampleSearch;
