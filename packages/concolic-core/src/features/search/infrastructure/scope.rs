//! Solver Scope Guard
//!
//! `push` on entry, `pop` on exit, including early `?` returns and unwinding.
//! Guards nest through `DerefMut`:
//!
//! ```text
//! let mut width_scope = SolverScope::enter(&mut solver);
//! width_scope.declare_bitvec("x", 32)?;
//! {
//!     let bound_scope = SolverScope::enter(&mut *width_scope);
//!     ...
//!     bound_scope.close()?;
//! }
//! width_scope.close()?;
//! ```

use super::solvers::SmtSolver;
use crate::errors::Result;
use std::ops::{Deref, DerefMut};
use tracing::error;

/// RAII solver scope
pub struct SolverScope<'a, S: SmtSolver + ?Sized> {
    solver: &'a mut S,
    open: bool,
}

impl<'a, S: SmtSolver + ?Sized> SolverScope<'a, S> {
    /// Push a scope on `solver`
    pub fn enter(solver: &'a mut S) -> Self {
        solver.push();
        Self { solver, open: true }
    }

    /// Pop the scope, reporting a failing pop
    pub fn close(mut self) -> Result<()> {
        self.open = false;
        self.solver.pop()
    }
}

impl<S: SmtSolver + ?Sized> Deref for SolverScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.solver
    }
}

impl<S: SmtSolver + ?Sized> DerefMut for SolverScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut *self.solver
    }
}

impl<S: SmtSolver + ?Sized> Drop for SolverScope<'_, S> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(e) = self.solver.pop() {
                error!(solver = self.solver.name(), error = %e, "failed to pop solver scope");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConcolicError;
    use crate::features::search::infrastructure::solvers::BoundedSolver;

    #[test]
    fn test_close_pops() {
        let mut solver = BoundedSolver::new();
        let scope = SolverScope::enter(&mut solver);
        assert_eq!(scope.depth(), 1);
        scope.close().unwrap();
        assert_eq!(solver.depth(), 0);
    }

    #[test]
    fn test_nested_scopes_drop_on_early_return() {
        fn fails_inside(solver: &mut BoundedSolver) -> crate::errors::Result<()> {
            let mut outer = SolverScope::enter(solver);
            outer.declare_bitvec("x", 8)?;
            let mut inner = SolverScope::enter(&mut *outer);
            assert_eq!(inner.depth(), 2);
            inner.declare_bitvec("x", 8)?;
            unreachable!("duplicate declaration must fail");
        }

        let mut solver = BoundedSolver::new();
        let err = fails_inside(&mut solver).unwrap_err();
        assert!(matches!(err, ConcolicError::DuplicateVariable { .. }));
        assert_eq!(solver.depth(), 0);
        // base scope is clean again
        solver.declare_bitvec("x", 8).unwrap();
    }
}
