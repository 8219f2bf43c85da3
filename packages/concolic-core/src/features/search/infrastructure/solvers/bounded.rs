//! Bounded Model Finder
//!
//! Pure-Rust fallback solver: no Z3 required.
//!
//! Each check first reads a signed interval per variable from the top-level
//! comparison atoms (conjunctions are flattened, a negated atom is
//! complemented). An atom narrows when both sides are linear in at most one
//! shared variable, `a·v + b`, and neither side can wrap at its width over
//! the current interval; narrowing repeats until the intervals settle. An
//! empty interval or a constant-false atom is an immediate UNSAT. If the
//! product of interval sizes fits in `max_candidates`, every assignment is
//! enumerated, smallest magnitudes first, and evaluated with exact bit-vector
//! semantics; otherwise the check is UNKNOWN.
//!
//! Verdicts are exact for the enumerated space: SAT comes with a model that
//! satisfies every live assertion, UNSAT means no assignment inside the
//! intervals does (and the intervals are implied by the assertions).

use super::bitvec::{self, BitAssignment};
use super::{CheckResult, SmtSolver};
use crate::config::BoundedSolverConfig;
use crate::errors::{ConcolicError, Result};
use crate::features::search::domain::formula::{max_signed, to_signed, truncate};
use crate::features::search::domain::{BvCmp, BvOp, BvTerm, Formula};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Model of the bounded solver: variable → bit pattern
pub type BoundedModel = BitAssignment;

/// Upper limit on interval propagation passes per check
const PROPAGATION_ROUNDS: usize = 16;

#[derive(Debug, Default)]
struct Frame {
    declarations: Vec<(String, u32)>,
    assertions: Vec<Formula>,
}

/// Closed signed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    lo: i128,
    hi: i128,
    empty: bool,
}

impl Interval {
    fn full(width: u32) -> Self {
        let hi = max_signed(width);
        Self {
            lo: -hi - 1,
            hi,
            empty: false,
        }
    }

    /// Intersect with `{ v | v op c }`
    fn narrow(&mut self, op: BvCmp, c: i128) {
        match op {
            BvCmp::Eq => {
                self.lo = self.lo.max(c);
                self.hi = self.hi.min(c);
            }
            // only an endpoint can be carved out
            BvCmp::Ne if c == self.lo => match c.checked_add(1) {
                Some(next) => self.lo = next,
                None => self.empty = true,
            },
            BvCmp::Ne if c == self.hi => match c.checked_sub(1) {
                Some(prev) => self.hi = prev,
                None => self.empty = true,
            },
            BvCmp::Ne => {}
            BvCmp::Slt => match c.checked_sub(1) {
                Some(c) => self.hi = self.hi.min(c),
                None => self.empty = true,
            },
            BvCmp::Sle => self.hi = self.hi.min(c),
            BvCmp::Sgt => match c.checked_add(1) {
                Some(c) => self.lo = self.lo.max(c),
                None => self.empty = true,
            },
            BvCmp::Sge => self.lo = self.lo.max(c),
        }
        if self.lo > self.hi {
            self.empty = true;
        }
    }

    /// Intersect with `{ v | coeff·v op rest }`, `coeff != 0`
    fn narrow_scaled(&mut self, op: BvCmp, coeff: i128, rest: i128) {
        let (op, coeff, rest) = if coeff < 0 {
            match (coeff.checked_neg(), rest.checked_neg()) {
                (Some(coeff), Some(rest)) => (op.flip(), coeff, rest),
                _ => return,
            }
        } else {
            (op, coeff, rest)
        };

        let floor = rest.div_euclid(coeff);
        let exact = rest.rem_euclid(coeff) == 0;
        // not exact implies coeff >= 2, so floor + 1 cannot overflow
        let ceil = if exact { floor } else { floor + 1 };
        match op {
            BvCmp::Eq if !exact => self.empty = true,
            BvCmp::Ne if !exact => {}
            BvCmp::Eq | BvCmp::Ne | BvCmp::Sle | BvCmp::Sgt => self.narrow(op, floor),
            BvCmp::Slt | BvCmp::Sge => self.narrow(op, ceil),
        }
    }

    /// Number of members, `None` if it does not fit in `u128`
    fn size(&self) -> Option<u128> {
        if self.empty {
            return Some(0);
        }
        self.hi.abs_diff(self.lo).checked_add(1)
    }

    /// `index`-th member in order of increasing magnitude (positive first on ties)
    fn nth(&self, index: u128) -> i128 {
        let i = index as i128;
        if self.lo >= 0 {
            return self.lo + i;
        }
        if self.hi <= 0 {
            return self.hi - i;
        }

        let positives = self.hi.unsigned_abs();
        let negatives = self.lo.unsigned_abs();
        let paired = positives.min(negatives);
        if index == 0 {
            0
        } else if index <= 2 * paired {
            let k = ((index + 1) / 2) as i128;
            if index % 2 == 1 {
                k
            } else {
                -k
            }
        } else {
            let k = (paired + (index - 2 * paired)) as i128;
            if positives > negatives {
                k
            } else {
                -k
            }
        }
    }
}

/// `coeff·var + offset`, free of wrap-around over the current intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Linear<'f> {
    var: Option<&'f str>,
    coeff: i128,
    offset: i128,
}

impl<'f> Linear<'f> {
    fn constant(offset: i128) -> Self {
        Self {
            var: None,
            coeff: 0,
            offset,
        }
    }

    /// Value range over the variable's interval, `None` if it leaves `i128`
    fn range(&self, intervals: &FxHashMap<String, Interval>) -> Option<(i128, i128)> {
        let Some(var) = self.var else {
            return Some((self.offset, self.offset));
        };
        let interval = intervals.get(var)?;
        let at = |v: i128| self.coeff.checked_mul(v)?.checked_add(self.offset);
        let (lo, hi) = (at(interval.lo)?, at(interval.hi)?);
        Some((lo.min(hi), lo.max(hi)))
    }

    /// Linear form of `term`; `None` if it is non-linear or may wrap at its width
    fn of(term: &'f BvTerm, intervals: &FxHashMap<String, Interval>) -> Option<Self> {
        let (op, lhs, rhs) = match term {
            BvTerm::Var { name, .. } => {
                return intervals
                    .get(name)
                    .filter(|interval| !interval.empty)
                    .map(|_| Self {
                        var: Some(name.as_str()),
                        coeff: 1,
                        offset: 0,
                    });
            }
            BvTerm::Const { value, .. } => return Some(Self::constant(*value)),
            BvTerm::Binary { op, lhs, rhs } => {
                (*op, Self::of(lhs, intervals)?, Self::of(rhs, intervals)?)
            }
            BvTerm::Ite { .. } => return None,
        };

        let var = shared_var(lhs.var, rhs.var)?;
        let (coeff, offset) = match op {
            BvOp::Add => (
                lhs.coeff.checked_add(rhs.coeff)?,
                lhs.offset.checked_add(rhs.offset)?,
            ),
            BvOp::Sub => (
                lhs.coeff.checked_sub(rhs.coeff)?,
                lhs.offset.checked_sub(rhs.offset)?,
            ),
            BvOp::Mul => {
                let (scaled, factor) = match (lhs.var, rhs.var) {
                    (_, None) => (lhs, rhs.offset),
                    (None, _) => (rhs, lhs.offset),
                    _ => return None,
                };
                (
                    scaled.coeff.checked_mul(factor)?,
                    scaled.offset.checked_mul(factor)?,
                )
            }
            _ => return None,
        };

        let linear = Self { var, coeff, offset };
        let (lo, hi) = linear.range(intervals)?;
        let max = max_signed(term.width());
        (lo >= -max - 1 && hi <= max).then_some(linear)
    }
}

/// Common variable of two linear forms, `None` if they name different ones
fn shared_var<'f>(a: Option<&'f str>, b: Option<&'f str>) -> Option<Option<&'f str>> {
    match (a, b) {
        (Some(a), Some(b)) if a != b => None,
        (a, b) => Some(a.or(b)),
    }
}

fn holds(op: BvCmp, lhs: i128, rhs: i128) -> bool {
    match op {
        BvCmp::Eq => lhs == rhs,
        BvCmp::Ne => lhs != rhs,
        BvCmp::Slt => lhs < rhs,
        BvCmp::Sle => lhs <= rhs,
        BvCmp::Sgt => lhs > rhs,
        BvCmp::Sge => lhs >= rhs,
    }
}

/// Bounded enumeration solver
#[derive(Debug)]
pub struct BoundedSolver {
    config: BoundedSolverConfig,
    frames: Vec<Frame>,
    model: Option<BoundedModel>,
}

impl Default for BoundedSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundedSolver {
    /// Create new bounded solver with default budget
    pub fn new() -> Self {
        Self::with_config(BoundedSolverConfig::default())
    }

    /// Create new bounded solver with a custom budget
    pub fn with_config(config: BoundedSolverConfig) -> Self {
        Self {
            config,
            frames: vec![Frame::default()],
            model: None,
        }
    }

    pub fn config(&self) -> &BoundedSolverConfig {
        &self.config
    }

    fn declared_width(&self, name: &str) -> Option<u32> {
        self.frames
            .iter()
            .flat_map(|frame| frame.declarations.iter())
            .find(|(declared, _)| declared == name)
            .map(|(_, width)| *width)
    }

    fn assertions(&self) -> impl Iterator<Item = &Formula> {
        self.frames.iter().flat_map(|frame| frame.assertions.iter())
    }

    fn declarations(&self) -> impl Iterator<Item = &(String, u32)> {
        self.frames.iter().flat_map(|frame| frame.declarations.iter())
    }

    /// Narrow intervals using the comparison atoms of `formula`; `false` on a contradiction
    fn collect_bounds(formula: &Formula, intervals: &mut FxHashMap<String, Interval>) -> bool {
        let (op, lhs, rhs) = match formula {
            Formula::And(parts) => {
                return parts
                    .iter()
                    .all(|part| Self::collect_bounds(part, intervals));
            }
            Formula::Compare { op, lhs, rhs } => (*op, lhs, rhs),
            Formula::Not(inner) => match inner.as_ref() {
                Formula::Compare { op, lhs, rhs } => (op.complement(), lhs, rhs),
                _ => return true,
            },
        };

        let (Some(lhs), Some(rhs)) = (Linear::of(lhs, intervals), Linear::of(rhs, intervals))
        else {
            return true;
        };
        let Some(var) = shared_var(lhs.var, rhs.var) else {
            return true;
        };
        // coeff·var op rest
        let (Some(coeff), Some(rest)) = (
            lhs.coeff.checked_sub(rhs.coeff),
            rhs.offset.checked_sub(lhs.offset),
        ) else {
            return true;
        };

        match var {
            Some(name) if coeff != 0 => {
                if let Some(interval) = intervals.get_mut(name) {
                    interval.narrow_scaled(op, coeff, rest);
                }
                true
            }
            _ => holds(op, 0, rest),
        }
    }

    fn search(&self) -> CheckResultWithModel {
        let mut intervals: FxHashMap<String, Interval> = self
            .declarations()
            .map(|(name, width)| (name.clone(), Interval::full(*width)))
            .collect();
        for _ in 0..PROPAGATION_ROUNDS {
            let before = intervals.clone();
            for formula in self.assertions() {
                if !Self::collect_bounds(formula, &mut intervals) {
                    debug!(%formula, "bounded solver: contradictory atom");
                    return (CheckResult::Unsat, None);
                }
            }
            if intervals == before {
                break;
            }
        }

        if let Some((name, _)) = intervals.iter().find(|(_, interval)| interval.empty) {
            debug!(variable = %name, "bounded solver: empty interval");
            return (CheckResult::Unsat, None);
        }

        // Variables no assertion mentions are fixed at zero
        let mut constrained: Vec<&str> = Vec::new();
        for formula in self.assertions() {
            for name in formula.variables() {
                if !constrained.contains(&name) {
                    constrained.push(name);
                }
            }
        }

        let mut env = BoundedModel::default();
        for (name, _) in self.declarations() {
            env.insert(name.clone(), 0);
        }

        let mut axes: Vec<(&str, u32, Interval, u128)> = Vec::with_capacity(constrained.len());
        let mut candidates: u128 = 1;
        for name in constrained {
            let (Some(width), Some(interval)) = (self.declared_width(name), intervals.get(name))
            else {
                continue;
            };
            let size = match interval.size() {
                Some(size) => size,
                None => return (CheckResult::Unknown, None),
            };
            candidates = match candidates.checked_mul(size) {
                Some(product) => product,
                None => return (CheckResult::Unknown, None),
            };
            axes.push((name, width, *interval, size));
        }

        if candidates > self.config.max_candidates as u128 {
            debug!(
                candidates = %candidates,
                limit = self.config.max_candidates,
                "bounded solver: candidate space too large"
            );
            return (CheckResult::Unknown, None);
        }
        debug!(candidates = %candidates, variables = axes.len(), "bounded solver: enumerating");

        // Odometer over the axes, first axis fastest
        let mut digits = vec![0u128; axes.len()];
        loop {
            for ((name, width, interval, _), digit) in axes.iter().zip(&digits) {
                env.insert(name.to_string(), truncate(interval.nth(*digit), *width));
            }

            let satisfied = self
                .assertions()
                .all(|formula| bitvec::eval_formula(formula, &env).unwrap_or(false));
            if satisfied {
                return (CheckResult::Sat, Some(env));
            }

            let mut carry = true;
            for ((_, _, _, size), digit) in axes.iter().zip(digits.iter_mut()) {
                *digit += 1;
                if *digit < *size {
                    carry = false;
                    break;
                }
                *digit = 0;
            }
            if carry {
                return (CheckResult::Unsat, None);
            }
        }
    }
}

type CheckResultWithModel = (CheckResult, Option<BoundedModel>);

impl SmtSolver for BoundedSolver {
    type Model = BoundedModel;

    fn name(&self) -> &'static str {
        "bounded"
    }

    fn declare_bitvec(&mut self, name: &str, width: u32) -> Result<()> {
        if self.declared_width(name).is_some() {
            return Err(ConcolicError::DuplicateVariable {
                name: name.to_string(),
            });
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.declarations.push((name.to_string(), width));
        }
        Ok(())
    }

    fn assert(&mut self, formula: &Formula) -> Result<()> {
        if let Some(name) = formula
            .variables()
            .into_iter()
            .find(|name| self.declared_width(name).is_none())
        {
            return Err(ConcolicError::UndeclaredVariable {
                name: name.to_string(),
            });
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.assertions.push(formula.clone());
        }
        Ok(())
    }

    fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    fn pop(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(ConcolicError::UnbalancedScope);
        }
        self.frames.pop();
        self.model = None;
        Ok(())
    }

    fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    fn check(&mut self) -> CheckResult {
        let (result, model) = self.search();
        self.model = model;
        result
    }

    fn get_model(&mut self) -> Option<Self::Model> {
        self.model.clone()
    }

    fn eval(&self, model: &Self::Model, term: &BvTerm) -> Option<i128> {
        bitvec::eval_term(term, model).map(|bits| to_signed(bits, term.width()))
    }
}
