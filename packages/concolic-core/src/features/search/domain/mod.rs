//! Search Domain Models
//!
//! Predicates over symbolic values, the bit-vector formula IR handed to
//! solvers, and the search result types.

pub mod formula;
pub mod outcome;
pub mod predicate;

pub use formula::{BvCmp, BvOp, BvTerm, Formula};
pub use outcome::{CounterexampleModel, SearchOutcome, SearchStats};
pub use predicate::Predicate;
