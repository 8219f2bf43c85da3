//! Model Validation
//!
//! Replays a solver model through native (unbounded `i128`) semantics. A model
//! is a real counterexample only if every assertion still holds and the query
//! fails; fixed-width wrap-around makes the two disagree.

use crate::errors::{ConcolicError, Result};
use crate::features::expression::SymbolicValue;
use crate::features::search::domain::{CounterexampleModel, Predicate};
use tracing::debug;

/// Truth of `predicate` under `model`, `None` on an arithmetic fault
fn holds_under(predicate: &Predicate, model: &CounterexampleModel) -> Result<Option<bool>> {
    let mut leaf = |var: &SymbolicValue| {
        model
            .get(var.name())
            .copied()
            .ok_or_else(|| ConcolicError::MissingModelValue {
                name: var.name().to_string(),
            })
    };

    match predicate.value.evaluate_with(&mut leaf) {
        Ok(value) => Ok(Some((value != 0) == predicate.expected)),
        Err(ConcolicError::ArithmeticFault {
            op,
            lhs,
            rhs,
            reason,
        }) => {
            debug!(%op, %lhs, %rhs, reason, "native evaluation faulted under model");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Does `model` satisfy every assertion and falsify `query` natively
///
/// # Errors
///
/// `MissingModelValue` if the model lacks a variable the predicates use.
pub fn model_agrees(
    assertions: &[Predicate],
    query: &Predicate,
    model: &CounterexampleModel,
) -> Result<bool> {
    for assertion in assertions {
        if holds_under(assertion, model)? != Some(true) {
            debug!(%assertion, "assertion fails natively under model");
            return Ok(false);
        }
    }

    match holds_under(query, model)? {
        Some(false) => Ok(true),
        _ => {
            debug!(%query, "query not falsified natively under model");
            Ok(false)
        }
    }
}
