//! Concolic Value Wrapper
//!
//! A [`SymbolicValue`] carries both halves of concolic execution: the symbolic
//! expression describing how the value depends on the inputs, and the concrete
//! value the program actually computed.
//!
//! # Concolic agreement
//!
//! For every derived value, `concrete_value()` equals the native evaluation of
//! its expression under the concrete values of its variables. Operator
//! application maintains this by computing both halves at once; see
//! [`SymbolicValue::evaluate`] for the check.
//!
//! # Identity
//!
//! Handles are `Rc`-shared. Cloning a handle does not create a new variable:
//! two clones are the same value for [`SymbolicValue::structural_equals`],
//! while two calls to [`SymbolicValue::variable`] with the same name are not.

use super::expression::Expression;
use super::operator::Operator;
use crate::errors::{ConcolicError, Result};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Name given to values produced by operator application
const DERIVED_NAME: &str = "se";

#[derive(Debug)]
struct ValueInner {
    name: String,
    expression: Option<Rc<Expression>>,
    concrete: Cell<Option<i128>>,
}

/// Concolic value: symbolic expression + concrete shadow value
#[derive(Debug, Clone)]
pub struct SymbolicValue {
    inner: Rc<ValueInner>,
}

/// Right-hand side of an operator application
#[derive(Debug, Clone)]
pub enum Operand {
    Value(SymbolicValue),
    Literal(i128),
}

impl From<SymbolicValue> for Operand {
    fn from(value: SymbolicValue) -> Self {
        Operand::Value(value)
    }
}

impl From<&SymbolicValue> for Operand {
    fn from(value: &SymbolicValue) -> Self {
        Operand::Value(value.clone())
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Literal(value.into())
    }
}

impl From<i128> for Operand {
    fn from(value: i128) -> Self {
        Operand::Literal(value)
    }
}

impl Operand {
    fn expression(&self) -> Rc<Expression> {
        match self {
            Operand::Value(value) => value.expression_or_self(),
            Operand::Literal(v) => Rc::new(Expression::Literal(*v)),
        }
    }

    fn concrete_value(&self) -> Result<i128> {
        match self {
            Operand::Value(value) => value.concrete_value(),
            Operand::Literal(v) => Ok(*v),
        }
    }
}

impl SymbolicValue {
    /// Create a free symbolic variable (concrete value not yet known)
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(name.into(), None, None)
    }

    /// Create a free symbolic variable with its concrete value
    pub fn variable_with_value(name: impl Into<String>, concrete: i128) -> Self {
        Self::new(name.into(), None, Some(concrete))
    }

    /// Create a derived value from an expression and its concrete result
    pub fn derived(expression: Rc<Expression>, concrete: i128) -> Self {
        Self::new(DERIVED_NAME.to_string(), Some(expression), Some(concrete))
    }

    fn new(name: String, expression: Option<Rc<Expression>>, concrete: Option<i128>) -> Self {
        Self {
            inner: Rc::new(ValueInner {
                name,
                expression,
                concrete: Cell::new(concrete),
            }),
        }
    }

    /// Human-readable identity; the solver key when the value is a variable
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// `None` for variables
    pub fn expression(&self) -> Option<&Rc<Expression>> {
        self.inner.expression.as_ref()
    }

    /// True iff this value is a free variable
    pub fn is_variable(&self) -> bool {
        self.inner.expression.is_none()
    }

    /// Same underlying value (not merely an equal one)
    pub fn ptr_eq(&self, other: &SymbolicValue) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Concrete shadow value
    ///
    /// # Errors
    ///
    /// [`ConcolicError::ConcreteValueUnset`] if the producer never supplied it.
    pub fn concrete_value(&self) -> Result<i128> {
        self.inner
            .concrete
            .get()
            .ok_or_else(|| ConcolicError::ConcreteValueUnset {
                name: self.inner.name.clone(),
            })
    }

    /// Record the concrete value observed at runtime
    pub fn set_concrete_value(&self, value: i128) {
        self.inner.concrete.set(Some(value));
    }

    /// Concrete truth value (non-zero is true)
    pub fn truthy(&self) -> Result<bool> {
        Ok(self.concrete_value()? != 0)
    }

    /// Expression of a derived value, or a leaf referring to this variable
    pub fn expression_or_self(&self) -> Rc<Expression> {
        match &self.inner.expression {
            Some(expr) => Rc::clone(expr),
            None => Rc::new(Expression::Variable(self.clone())),
        }
    }

    /// Build `self op rhs`: a new tree node plus its concrete result
    pub fn apply_binary(&self, op: Operator, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        let rhs = rhs.into();
        let concrete = op.apply(self.concrete_value()?, rhs.concrete_value()?)?;
        let expression = Rc::new(Expression::binary(
            op,
            self.expression_or_self(),
            rhs.expression(),
        ));
        trace!(%expression, %concrete, "operator applied");
        Ok(Self::derived(expression, concrete))
    }

    pub fn add(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Add, rhs)
    }

    pub fn sub(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Sub, rhs)
    }

    pub fn mul(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Mul, rhs)
    }

    pub fn div(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Div, rhs)
    }

    pub fn rem(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Mod, rhs)
    }

    pub fn shl(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Shl, rhs)
    }

    pub fn shr(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Shr, rhs)
    }

    pub fn bitxor(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Xor, rhs)
    }

    pub fn bitor(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Or, rhs)
    }

    pub fn bitand(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::And, rhs)
    }

    pub fn equals(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Eq, rhs)
    }

    pub fn not_equals(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Ne, rhs)
    }

    pub fn less_than(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Lt, rhs)
    }

    pub fn less_equal(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Le, rhs)
    }

    pub fn greater_than(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Gt, rhs)
    }

    pub fn greater_equal(&self, rhs: impl Into<Operand>) -> Result<SymbolicValue> {
        self.apply_binary(Operator::Ge, rhs)
    }

    /// Structural equality.
    ///
    /// A variable is equal only to itself; otherwise the expression trees
    /// must match node for node.
    pub fn structural_equals(&self, other: &SymbolicValue) -> bool {
        match (&self.inner.expression, &other.inner.expression) {
            (Some(a), Some(b)) => a.structural_equals(b),
            _ => self.ptr_eq(other),
        }
    }

    /// Names of the variables this value depends on, depth-first, duplicates kept
    pub fn collect_variables(&self) -> Vec<String> {
        self.variable_leaves()
            .iter()
            .map(|var| var.name().to_string())
            .collect()
    }

    /// Variable handles this value depends on, depth-first, duplicates kept
    pub fn variable_leaves(&self) -> Vec<SymbolicValue> {
        match &self.inner.expression {
            None => vec![self.clone()],
            Some(expr) => {
                let mut out = Vec::new();
                expr.collect_variables(&mut out);
                out
            }
        }
    }

    /// Evaluate the expression, resolving variables through `leaf`
    pub fn evaluate_with<F>(&self, leaf: &mut F) -> Result<i128>
    where
        F: FnMut(&SymbolicValue) -> Result<i128>,
    {
        match &self.inner.expression {
            None => leaf(self),
            Some(expr) => expr.evaluate_with(leaf),
        }
    }

    /// Re-evaluate the expression under the variables' current concrete values
    pub fn evaluate(&self) -> Result<i128> {
        self.evaluate_with(&mut |var: &SymbolicValue| var.concrete_value())
    }
}

impl fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.expression {
            None => f.write_str(&self.inner.name),
            Some(expr) => write!(f, "{}", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_has_no_expression() {
        let x = SymbolicValue::variable("x");
        assert!(x.is_variable());
        assert!(x.expression().is_none());
        assert_eq!(x.name(), "x");
    }

    #[test]
    fn test_unset_concrete_value_fails() {
        let x = SymbolicValue::variable("x");
        let err = x.concrete_value().unwrap_err();
        assert!(matches!(err, ConcolicError::ConcreteValueUnset { ref name } if name == "x"));
        assert!(x.add(1).is_err());
    }

    #[test]
    fn test_apply_binary_builds_node() {
        let x = SymbolicValue::variable_with_value("x", 10);
        let sum = x.add(5).unwrap();

        assert!(!sum.is_variable());
        assert_eq!(sum.concrete_value().unwrap(), 15);
        assert_eq!(sum.to_string(), "(x + 5)");
    }

    #[test]
    fn test_relational_is_integer_valued() {
        let x = SymbolicValue::variable_with_value("x", 3);
        let y = SymbolicValue::variable_with_value("y", 7);

        // (x < y) + 1
        let lt = x.less_than(&y).unwrap();
        let bumped = lt.add(1).unwrap();
        assert_eq!(lt.concrete_value().unwrap(), 1);
        assert_eq!(bumped.concrete_value().unwrap(), 2);
        assert_eq!(bumped.to_string(), "((x < y) + 1)");
    }

    #[test]
    fn test_derived_operand_is_shared_not_copied() {
        let x = SymbolicValue::variable_with_value("x", 2);
        let double = x.mul(2).unwrap();
        let quad = double.add(&double).unwrap();

        match quad.expression().map(|e| e.as_ref()) {
            Some(Expression::Binary { left, right, .. }) => {
                let shared = double.expression().unwrap();
                assert!(Rc::ptr_eq(left, shared));
                assert!(Rc::ptr_eq(right, shared));
            }
            other => panic!("expected binary node, got {:?}", other),
        }
    }

    #[test]
    fn test_variable_structural_identity() {
        let x = SymbolicValue::variable("x");
        let x_again = SymbolicValue::variable("x");

        assert!(x.structural_equals(&x));
        assert!(x.structural_equals(&x.clone()));
        assert!(!x.structural_equals(&x_again));
    }

    #[test]
    fn test_collect_variables_order_and_duplicates() {
        let x = SymbolicValue::variable_with_value("x", 1);
        let y = SymbolicValue::variable_with_value("y", 2);

        let expr = x.add(&y).unwrap().mul(&x).unwrap();
        assert_eq!(expr.collect_variables(), vec!["x", "y", "x"]);
        assert_eq!(x.collect_variables(), vec!["x"]);
        assert!(SymbolicValue::derived(Rc::new(Expression::Literal(4)), 4)
            .collect_variables()
            .is_empty());
    }

    #[test]
    fn test_evaluate_tracks_leaf_updates() {
        let x = SymbolicValue::variable_with_value("x", 4);
        let expr = x.mul(3).unwrap().sub(2).unwrap();
        assert_eq!(expr.evaluate().unwrap(), expr.concrete_value().unwrap());

        x.set_concrete_value(5);
        assert_eq!(expr.evaluate().unwrap(), 13);
        // shadow is a snapshot of the operation, not a live view
        assert_eq!(expr.concrete_value().unwrap(), 10);
    }

    #[test]
    fn test_truthy() {
        let x = SymbolicValue::variable_with_value("x", 0);
        assert!(!x.truthy().unwrap());
        x.set_concrete_value(-3);
        assert!(x.truthy().unwrap());
    }
}
