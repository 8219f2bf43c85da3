//! Expression Domain Models

pub mod expression;
pub mod operator;
pub mod symbolic_value;

pub use expression::Expression;
pub use operator::Operator;
pub use symbolic_value::{Operand, SymbolicValue};
