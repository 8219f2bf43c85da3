//! Predicate Domain Model
//!
//! A branch outcome observed along a concrete execution: "this value, read as
//! a truth value, was `expected`". Path conditions are ordered predicate
//! sequences; a query is the single predicate whose negation is sought.

use crate::errors::Result;
use crate::features::expression::SymbolicValue;
use std::fmt;

/// Asserted truth value of a symbolic value
#[derive(Debug, Clone)]
pub struct Predicate {
    /// Condition, integer-valued (non-zero is true)
    pub value: SymbolicValue,

    /// Branch outcome
    pub expected: bool,
}

impl Predicate {
    /// Create new predicate
    pub fn new(value: SymbolicValue, expected: bool) -> Self {
        Self { value, expected }
    }

    /// Predicate asserting `value` is true
    pub fn holds(value: SymbolicValue) -> Self {
        Self::new(value, true)
    }

    /// Predicate asserting `value` is false
    pub fn fails(value: SymbolicValue) -> Self {
        Self::new(value, false)
    }

    /// Same condition, opposite outcome
    pub fn negated(&self) -> Self {
        Self::new(self.value.clone(), !self.expected)
    }

    /// Does the predicate hold for the current concrete values of its variables
    pub fn holds_concretely(&self) -> Result<bool> {
        Ok((self.value.evaluate()? != 0) == self.expected)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected {
            write!(f, "{}", self.value)
        } else {
            write!(f, "not {}", self.value)
        }
    }
}
