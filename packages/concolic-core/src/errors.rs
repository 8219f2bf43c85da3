//! Error types for concolic-core
//!
//! Provides unified error handling across the crate.

use crate::config::ConfigError;
use crate::features::expression::Operator;
use thiserror::Error;

/// Main error type for concolic-core operations
#[derive(Debug, Error)]
pub enum ConcolicError {
    /// A concrete shadow value was read before the producer supplied it
    #[error("Concrete value of '{name}' read before it was set")]
    ConcreteValueUnset { name: String },

    /// Two distinct solver variables share a name
    #[error("Duplicate solver variable '{name}'")]
    DuplicateVariable { name: String },

    /// Formula refers to a name the solver never declared
    #[error("Solver variable '{name}' used before declaration")]
    UndeclaredVariable { name: String },

    /// pop() without a matching push()
    #[error("Unbalanced solver scope: pop at depth 0")]
    UnbalancedScope,

    /// Satisfying model carries no value for a variable of the query
    #[error("Model has no value for variable '{name}'")]
    MissingModelValue { name: String },

    /// Node or operator outside the supported set
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// Native integer semantics undefined for the operands
    #[error("Arithmetic fault evaluating {lhs} {op} {rhs}: {reason}")]
    ArithmeticFault {
        op: Operator,
        lhs: i128,
        rhs: i128,
        reason: &'static str,
    },

    /// Solver backend error
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ConcolicError {
    /// Create an unsupported-expression error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        ConcolicError::UnsupportedExpression(msg.into())
    }

    /// Create a solver error
    pub fn solver(msg: impl Into<String>) -> Self {
        ConcolicError::Solver(msg.into())
    }

    /// Invariant violations in the calling code rather than in the input
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            ConcolicError::ConcreteValueUnset { .. }
                | ConcolicError::DuplicateVariable { .. }
                | ConcolicError::UndeclaredVariable { .. }
                | ConcolicError::UnbalancedScope
                | ConcolicError::MissingModelValue { .. }
        )
    }
}

/// Result type alias for concolic operations
pub type Result<T> = std::result::Result<T, ConcolicError>;
