//! Z3 SMT Solver Backend - Bit-Vector Theory
//!
//! Translates the formula IR into Z3 `QF_BV` terms. Only available when
//! compiled with `--features z3`.
//!
//! ## Installation
//!
//! ```bash
//! # Install Z3 library
//! apt-get install libz3-dev  # Linux
//! brew install z3            # macOS
//!
//! # Build with Z3 support
//! cargo build --release --features z3
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use concolic_core::{CounterexampleSearch, Z3Solver};
//! use z3::{Config, Context};
//!
//! let ctx = Context::new(&Config::new());
//! let mut search = CounterexampleSearch::new(Z3Solver::new(&ctx));
//! let outcome = search.find_counterexample(&assertions, &query)?;
//! ```

#![cfg(feature = "z3")]

use super::{CheckResult, SmtSolver};
use crate::errors::{ConcolicError, Result};
use crate::features::search::domain::formula::to_signed;
use crate::features::search::domain::{BvCmp, BvOp, BvTerm, Formula};
use rustc_hash::FxHashMap;
use tracing::debug;
use z3::ast::{Ast, Bool, Int, BV};
use z3::{Context, Model, SatResult, Solver};

/// Z3 solver backend over fixed-width bit-vectors
pub struct Z3Solver<'ctx> {
    ctx: &'ctx Context,
    solver: Solver<'ctx>,
    /// Declared bit-vector constants
    vars: FxHashMap<String, BV<'ctx>>,
    /// Names declared per open scope (index 0 is the base scope)
    frames: Vec<Vec<String>>,
}

impl<'ctx> Z3Solver<'ctx> {
    /// Create new Z3 backend on `ctx`
    pub fn new(ctx: &'ctx Context) -> Self {
        Self {
            ctx,
            solver: Solver::new(ctx),
            vars: FxHashMap::default(),
            frames: vec![Vec::new()],
        }
    }

    fn constant(&self, value: i128, width: u32) -> Result<BV<'ctx>> {
        if let Ok(small) = i64::try_from(value) {
            return Ok(BV::from_i64(self.ctx, small, width));
        }
        let int = Int::from_str(self.ctx, &value.to_string())
            .ok_or_else(|| ConcolicError::solver(format!("bad numeral {}", value)))?;
        Ok(BV::from_int(&int, width))
    }

    fn term(&self, term: &BvTerm) -> Result<BV<'ctx>> {
        match term {
            BvTerm::Var { name, .. } => {
                self.vars
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConcolicError::UndeclaredVariable {
                        name: name.clone(),
                    })
            }
            BvTerm::Const { value, width } => self.constant(*value, *width),
            BvTerm::Binary { op, lhs, rhs } => {
                let (l, r) = (self.term(lhs)?, self.term(rhs)?);
                Ok(match op {
                    BvOp::Add => l.bvadd(&r),
                    BvOp::Sub => l.bvsub(&r),
                    BvOp::Mul => l.bvmul(&r),
                    BvOp::SDiv => l.bvsdiv(&r),
                    BvOp::SRem => l.bvsrem(&r),
                    BvOp::Shl => l.bvshl(&r),
                    BvOp::AShr => l.bvashr(&r),
                    BvOp::Xor => l.bvxor(&r),
                    BvOp::Or => l.bvor(&r),
                    BvOp::And => l.bvand(&r),
                })
            }
            BvTerm::Ite {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.formula(cond)?;
                Ok(cond.ite(&self.term(then)?, &self.term(otherwise)?))
            }
        }
    }

    fn formula(&self, formula: &Formula) -> Result<Bool<'ctx>> {
        match formula {
            Formula::Compare { op, lhs, rhs } => {
                let (l, r) = (self.term(lhs)?, self.term(rhs)?);
                Ok(match op {
                    BvCmp::Eq => l._eq(&r),
                    BvCmp::Ne => l._eq(&r).not(),
                    BvCmp::Slt => l.bvslt(&r),
                    BvCmp::Sle => l.bvsle(&r),
                    BvCmp::Sgt => l.bvsgt(&r),
                    BvCmp::Sge => l.bvsge(&r),
                })
            }
            Formula::Not(inner) => Ok(self.formula(inner)?.not()),
            Formula::And(parts) => {
                let parts = parts
                    .iter()
                    .map(|part| self.formula(part))
                    .collect::<Result<Vec<_>>>()?;
                let refs: Vec<&Bool<'ctx>> = parts.iter().collect();
                Ok(Bool::and(self.ctx, &refs))
            }
        }
    }
}

/// Parse a bit-vector numeral (`#x..` or `#b..`) into its bit pattern
fn parse_numeral(text: &str) -> Option<u128> {
    if let Some(hex) = text.strip_prefix("#x") {
        u128::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("#b") {
        u128::from_str_radix(bin, 2).ok()
    } else {
        None
    }
}

impl<'ctx> SmtSolver for Z3Solver<'ctx> {
    type Model = Model<'ctx>;

    fn name(&self) -> &'static str {
        "z3"
    }

    fn declare_bitvec(&mut self, name: &str, width: u32) -> Result<()> {
        if self.vars.contains_key(name) {
            return Err(ConcolicError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        let var = BV::new_const(self.ctx, name, width);
        self.vars.insert(name.to_string(), var);
        if let Some(frame) = self.frames.last_mut() {
            frame.push(name.to_string());
        }
        Ok(())
    }

    fn assert(&mut self, formula: &Formula) -> Result<()> {
        let translated = self.formula(formula)?;
        self.solver.assert(&translated);
        Ok(())
    }

    fn push(&mut self) {
        self.solver.push();
        self.frames.push(Vec::new());
    }

    fn pop(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(ConcolicError::UnbalancedScope);
        }
        if let Some(names) = self.frames.pop() {
            for name in names {
                self.vars.remove(&name);
            }
        }
        self.solver.pop(1);
        Ok(())
    }

    fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    fn check(&mut self) -> CheckResult {
        match self.solver.check() {
            SatResult::Sat => CheckResult::Sat,
            SatResult::Unsat => CheckResult::Unsat,
            SatResult::Unknown => {
                debug!(reason = ?self.solver.get_reason_unknown(), "z3: unknown");
                CheckResult::Unknown
            }
        }
    }

    fn get_model(&mut self) -> Option<Self::Model> {
        self.solver.get_model()
    }

    fn eval(&self, model: &Self::Model, term: &BvTerm) -> Option<i128> {
        let translated = self.term(term).ok()?;
        let value = model.eval(&translated, true)?;
        let bits = parse_numeral(&value.simplify().to_string())?;
        Some(to_signed(bits, term.width()))
    }
}
