//! Expression Tree
//!
//! Symbolic computations as immutable trees. Interior nodes own their
//! children through `Rc`, so a derived value reused in several places is
//! shared rather than copied, and variable leaves point at the variable value
//! itself. Trees never contain back-edges.

use super::operator::Operator;
use super::symbolic_value::SymbolicValue;
use crate::errors::Result;
use std::fmt;
use std::rc::Rc;

/// Node of a symbolic expression tree
#[derive(Debug, Clone)]
pub enum Expression {
    /// Named symbolic input (identity matters, see [`Expression::structural_equals`])
    Variable(SymbolicValue),

    /// Concrete integer constant
    Literal(i128),

    /// `left op right`
    Binary {
        op: Operator,
        left: Rc<Expression>,
        right: Rc<Expression>,
    },
}

impl Expression {
    /// Create a binary node
    pub fn binary(op: Operator, left: Rc<Expression>, right: Rc<Expression>) -> Self {
        Self::Binary { op, left, right }
    }

    /// Structural comparison.
    ///
    /// Variable leaves compare by identity, literals by value, binary nodes
    /// require the operator and both subtrees to match.
    pub fn structural_equals(&self, other: &Expression) -> bool {
        match (self, other) {
            (Self::Variable(a), Self::Variable(b)) => a.ptr_eq(b),
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (
                Self::Binary {
                    op: op_a,
                    left: left_a,
                    right: right_a,
                },
                Self::Binary {
                    op: op_b,
                    left: left_b,
                    right: right_b,
                },
            ) => {
                op_a == op_b
                    && left_a.structural_equals(left_b)
                    && right_a.structural_equals(right_b)
            }
            _ => false,
        }
    }

    /// Variable leaves, depth-first, left to right, duplicates kept
    pub fn collect_variables(&self, out: &mut Vec<SymbolicValue>) {
        match self {
            Self::Variable(var) => out.push(var.clone()),
            Self::Literal(_) => {}
            Self::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
        }
    }

    /// Evaluate with native semantics, resolving variable leaves through `leaf`
    pub fn evaluate_with<F>(&self, leaf: &mut F) -> Result<i128>
    where
        F: FnMut(&SymbolicValue) -> Result<i128>,
    {
        match self {
            Self::Variable(var) => leaf(var),
            Self::Literal(value) => Ok(*value),
            Self::Binary { op, left, right } => {
                let lhs = left.evaluate_with(leaf)?;
                let rhs = right.evaluate_with(leaf)?;
                op.apply(lhs, rhs)
            }
        }
    }

    /// Number of nodes in the tree (shared subtrees counted per use)
    pub fn size(&self) -> usize {
        match self {
            Self::Variable(_) | Self::Literal(_) => 1,
            Self::Binary { left, right, .. } => 1 + left.size() + right.size(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(var) => write!(f, "{}", var.name()),
            Self::Literal(value) => write!(f, "{}", value),
            Self::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i128) -> Rc<Expression> {
        Rc::new(Expression::Literal(v))
    }

    #[test]
    fn test_literal_equality_by_value() {
        assert!(Expression::Literal(3).structural_equals(&Expression::Literal(3)));
        assert!(!Expression::Literal(3).structural_equals(&Expression::Literal(4)));
    }

    #[test]
    fn test_binary_requires_all_parts() {
        let a = Expression::binary(Operator::Add, lit(1), lit(2));
        let same = Expression::binary(Operator::Add, lit(1), lit(2));
        let other_op = Expression::binary(Operator::Sub, lit(1), lit(2));
        let other_left = Expression::binary(Operator::Add, lit(9), lit(2));
        let other_right = Expression::binary(Operator::Add, lit(1), lit(9));

        assert!(a.structural_equals(&same));
        assert!(!a.structural_equals(&other_op));
        assert!(!a.structural_equals(&other_left));
        assert!(!a.structural_equals(&other_right));
    }

    #[test]
    fn test_kind_mismatch() {
        let x = SymbolicValue::variable("x");
        let leaf = Expression::Variable(x);
        assert!(!leaf.structural_equals(&Expression::Literal(0)));
        assert!(!Expression::Literal(0)
            .structural_equals(&Expression::binary(Operator::Add, lit(0), lit(0))));
    }

    #[test]
    fn test_display_and_size() {
        let x = SymbolicValue::variable("x");
        let tree = Expression::binary(
            Operator::Lt,
            Rc::new(Expression::Variable(x)),
            Rc::new(Expression::binary(Operator::Mul, lit(2), lit(3))),
        );
        assert_eq!(tree.to_string(), "(x < (2 * 3))");
        assert_eq!(tree.size(), 5);
    }

    #[test]
    fn test_evaluate_with_leaf_lookup() {
        let x = SymbolicValue::variable("x");
        let tree = Expression::binary(Operator::Sub, Rc::new(Expression::Variable(x)), lit(4));
        let value = tree.evaluate_with(&mut |_| Ok(10)).unwrap();
        assert_eq!(value, 6);
    }
}
