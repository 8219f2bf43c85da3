//! Predicate Lowering
//!
//! Translates predicates over symbolic values into bit-vector formulas at a
//! fixed width.
//!
//! - Literals wrap modulo 2^width
//! - Relational nodes inside arithmetic are reified as `ite(cmp, 1, 0)`
//! - A relational predicate root lowers to the comparison itself; any other
//!   root lowers to `term != 0`
//! - `expected = false` negates the formula
//!
//! One `Lowering` covers a whole query (assertions plus negated query) so
//! that variable identity can be checked across predicates.

use crate::errors::{ConcolicError, Result};
use crate::features::expression::{Expression, Operator, SymbolicValue};
use crate::features::search::domain::{BvCmp, BvOp, BvTerm, Formula, Predicate};
use rustc_hash::FxHashMap;
use tracing::error;

/// Solver comparison for a relational operator
fn comparison(op: Operator) -> Option<BvCmp> {
    match op {
        Operator::Eq => Some(BvCmp::Eq),
        Operator::Ne => Some(BvCmp::Ne),
        Operator::Lt => Some(BvCmp::Slt),
        Operator::Le => Some(BvCmp::Sle),
        Operator::Gt => Some(BvCmp::Sgt),
        Operator::Ge => Some(BvCmp::Sge),
        _ => None,
    }
}

/// Solver operator for an arithmetic or bitwise operator
fn bv_operator(op: Operator) -> Option<BvOp> {
    match op {
        Operator::Add => Some(BvOp::Add),
        Operator::Sub => Some(BvOp::Sub),
        Operator::Mul => Some(BvOp::Mul),
        Operator::Div => Some(BvOp::SDiv),
        Operator::Mod => Some(BvOp::SRem),
        Operator::Shl => Some(BvOp::Shl),
        Operator::Shr => Some(BvOp::AShr),
        Operator::Xor => Some(BvOp::Xor),
        Operator::Or => Some(BvOp::Or),
        Operator::And => Some(BvOp::And),
        _ => None,
    }
}

/// Fixed-width translator with a variable table
#[derive(Debug)]
pub struct Lowering {
    width: u32,
    by_name: FxHashMap<String, SymbolicValue>,
    ordered: Vec<SymbolicValue>,
}

impl Lowering {
    /// Create new translator for `width`-bit vectors
    pub fn new(width: u32) -> Self {
        Self {
            width,
            by_name: FxHashMap::default(),
            ordered: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Variables seen so far, first occurrence order
    pub fn variables(&self) -> &[SymbolicValue] {
        &self.ordered
    }

    /// Lower a predicate to a formula
    ///
    /// # Errors
    ///
    /// `DuplicateVariable` if two distinct variables share a name.
    pub fn lower_predicate(&mut self, predicate: &Predicate) -> Result<Formula> {
        let formula = match predicate.value.expression().map(|e| e.as_ref()) {
            Some(Expression::Binary { op, left, right }) if op.is_relational() => {
                self.lower_comparison(*op, left, right)?
            }
            _ => {
                let term = self.lower_value(&predicate.value)?;
                Formula::compare(BvCmp::Ne, term, BvTerm::constant(0, self.width))
            }
        };

        Ok(if predicate.expected {
            formula
        } else {
            formula.negate()
        })
    }

    /// Lower a value in term position
    pub fn lower_value(&mut self, value: &SymbolicValue) -> Result<BvTerm> {
        match value.expression() {
            None => self.lower_variable(value),
            Some(expr) => self.lower_expression(expr),
        }
    }

    fn lower_expression(&mut self, expr: &Expression) -> Result<BvTerm> {
        match expr {
            Expression::Variable(var) => self.lower_variable(var),
            Expression::Literal(value) => Ok(BvTerm::constant(*value, self.width)),
            Expression::Binary { op, left, right } => {
                if op.is_relational() {
                    let cmp = self.lower_comparison(*op, left, right)?;
                    return Ok(BvTerm::reify(cmp, self.width));
                }
                let bv_op = bv_operator(*op)
                    .ok_or_else(|| ConcolicError::unsupported(format!("operator '{}'", op)))?;
                let lhs = self.lower_expression(left)?;
                let rhs = self.lower_expression(right)?;
                Ok(BvTerm::binary(bv_op, lhs, rhs))
            }
        }
    }

    fn lower_comparison(
        &mut self,
        op: Operator,
        left: &Expression,
        right: &Expression,
    ) -> Result<Formula> {
        let cmp = comparison(op)
            .ok_or_else(|| ConcolicError::unsupported(format!("comparison '{}'", op)))?;
        let lhs = self.lower_expression(left)?;
        let rhs = self.lower_expression(right)?;
        Ok(Formula::compare(cmp, lhs, rhs))
    }

    fn lower_variable(&mut self, var: &SymbolicValue) -> Result<BvTerm> {
        match self.by_name.get(var.name()) {
            Some(known) if known.ptr_eq(var) => {}
            Some(_) => {
                error!(name = var.name(), "distinct symbolic variables share a name");
                return Err(ConcolicError::DuplicateVariable {
                    name: var.name().to_string(),
                });
            }
            None => {
                self.by_name.insert(var.name().to_string(), var.clone());
                self.ordered.push(var.clone());
            }
        }
        Ok(BvTerm::var(var.name(), self.width))
    }
}
