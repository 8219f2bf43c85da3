//! Operator Domain Model
//!
//! Closed set of binary operators a concolic value can be combined with, and
//! their native (concrete) semantics over `i128`.

use crate::errors::{ConcolicError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary operators recognised by the expression model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    // Arithmetic
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division, truncating toward zero (/)
    Div,
    /// Remainder, sign of the dividend (%)
    Mod,

    // Bitwise
    /// Left shift (<<)
    Shl,
    /// Arithmetic right shift (>>)
    Shr,
    /// Exclusive or (^)
    Xor,
    /// Inclusive or (|)
    Or,
    /// And (&)
    And,

    // Relational (0/1 valued)
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
}

impl Operator {
    /// All operators, arithmetic first
    pub const ALL: [Operator; 16] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Shl,
        Self::Shr,
        Self::Xor,
        Self::Or,
        Self::And,
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
    ];

    /// Source token of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Xor => "^",
            Self::Or => "|",
            Self::And => "&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Comparison operators produce a 0/1 integer
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    /// Apply the native semantics to two concrete operands
    pub fn apply(&self, lhs: i128, rhs: i128) -> Result<i128> {
        let fault = |reason: &'static str| ConcolicError::ArithmeticFault {
            op: *self,
            lhs,
            rhs,
            reason,
        };

        match self {
            Self::Add => lhs.checked_add(rhs).ok_or_else(|| fault("overflow")),
            Self::Sub => lhs.checked_sub(rhs).ok_or_else(|| fault("overflow")),
            Self::Mul => lhs.checked_mul(rhs).ok_or_else(|| fault("overflow")),
            Self::Div | Self::Mod if rhs == 0 => Err(fault("division by zero")),
            Self::Div => lhs.checked_div(rhs).ok_or_else(|| fault("overflow")),
            Self::Mod => lhs.checked_rem(rhs).ok_or_else(|| fault("overflow")),
            Self::Shl | Self::Shr if rhs < 0 => Err(fault("negative shift count")),
            Self::Shl => {
                if lhs == 0 {
                    Ok(0)
                } else if rhs >= 127 {
                    Err(fault("overflow"))
                } else {
                    lhs.checked_mul(1i128 << rhs).ok_or_else(|| fault("overflow"))
                }
            }
            Self::Shr => Ok(lhs >> rhs.min(127)),
            Self::Xor => Ok(lhs ^ rhs),
            Self::Or => Ok(lhs | rhs),
            Self::And => Ok(lhs & rhs),
            Self::Eq => Ok((lhs == rhs) as i128),
            Self::Ne => Ok((lhs != rhs) as i128),
            Self::Lt => Ok((lhs < rhs) as i128),
            Self::Le => Ok((lhs <= rhs) as i128),
            Self::Gt => Ok((lhs > rhs) as i128),
            Self::Ge => Ok((lhs >= rhs) as i128),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = ConcolicError;

    /// Parse the producer's operator token
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.symbol() == s.trim())
            .ok_or_else(|| ConcolicError::unsupported(format!("binary operator '{}'", s)))
    }
}
