//! Bit-Vector Semantics
//!
//! Exact SMT-LIB `QF_BV` evaluation of the formula IR over `u128` bit
//! patterns. Widths 1..=128 are supported; every result is masked to its width.
//!
//! Division follows SMT-LIB rather than native integers:
//! - `bvudiv x 0` is all ones, `bvurem x 0` is `x`
//! - `bvsdiv`/`bvsrem` reduce to the unsigned forms on magnitudes
//! - shifts by at least the width give 0 (`bvshl`) or the sign fill (`bvashr`)

use crate::features::search::domain::formula::{mask, to_signed, truncate};
use crate::features::search::domain::{BvCmp, BvOp, BvTerm, Formula};
use rustc_hash::FxHashMap;

/// Variable name → bit pattern
pub type BitAssignment = FxHashMap<String, u128>;

fn is_negative(bits: u128, width: u32) -> bool {
    bits >> (width - 1) & 1 == 1
}

fn neg(bits: u128, width: u32) -> u128 {
    bits.wrapping_neg() & mask(width)
}

fn udiv(lhs: u128, rhs: u128, width: u32) -> u128 {
    if rhs == 0 {
        mask(width)
    } else {
        lhs / rhs
    }
}

fn urem(lhs: u128, rhs: u128) -> u128 {
    if rhs == 0 {
        lhs
    } else {
        lhs % rhs
    }
}

fn sdiv(lhs: u128, rhs: u128, width: u32) -> u128 {
    match (is_negative(lhs, width), is_negative(rhs, width)) {
        (false, false) => udiv(lhs, rhs, width),
        (true, false) => neg(udiv(neg(lhs, width), rhs, width), width),
        (false, true) => neg(udiv(lhs, neg(rhs, width), width), width),
        (true, true) => udiv(neg(lhs, width), neg(rhs, width), width),
    }
}

fn srem(lhs: u128, rhs: u128, width: u32) -> u128 {
    match (is_negative(lhs, width), is_negative(rhs, width)) {
        (false, false) => urem(lhs, rhs),
        (true, false) => neg(urem(neg(lhs, width), rhs), width),
        (false, true) => urem(lhs, neg(rhs, width)),
        (true, true) => neg(urem(neg(lhs, width), neg(rhs, width)), width),
    }
}

fn shl(lhs: u128, rhs: u128, width: u32) -> u128 {
    if rhs >= width as u128 {
        0
    } else {
        (lhs << rhs) & mask(width)
    }
}

fn ashr(lhs: u128, rhs: u128, width: u32) -> u128 {
    let signed = to_signed(lhs, width);
    let shift = rhs.min(width as u128 - 1) as u32;
    truncate(signed >> shift, width)
}

/// Apply a bit-vector operator to two `width`-bit patterns
pub fn apply(op: BvOp, lhs: u128, rhs: u128, width: u32) -> u128 {
    let m = mask(width);
    match op {
        BvOp::Add => lhs.wrapping_add(rhs) & m,
        BvOp::Sub => lhs.wrapping_sub(rhs) & m,
        BvOp::Mul => lhs.wrapping_mul(rhs) & m,
        BvOp::SDiv => sdiv(lhs, rhs, width),
        BvOp::SRem => srem(lhs, rhs, width),
        BvOp::Shl => shl(lhs, rhs, width),
        BvOp::AShr => ashr(lhs, rhs, width),
        BvOp::Xor => (lhs ^ rhs) & m,
        BvOp::Or => (lhs | rhs) & m,
        BvOp::And => lhs & rhs & m,
    }
}

/// Signed comparison of two `width`-bit patterns
pub fn compare(op: BvCmp, lhs: u128, rhs: u128, width: u32) -> bool {
    let (l, r) = (to_signed(lhs, width), to_signed(rhs, width));
    match op {
        BvCmp::Eq => l == r,
        BvCmp::Ne => l != r,
        BvCmp::Slt => l < r,
        BvCmp::Sle => l <= r,
        BvCmp::Sgt => l > r,
        BvCmp::Sge => l >= r,
    }
}

/// Evaluate a term; `None` if it mentions an unassigned variable
pub fn eval_term(term: &BvTerm, env: &BitAssignment) -> Option<u128> {
    match term {
        BvTerm::Var { name, width } => env.get(name).map(|bits| bits & mask(*width)),
        BvTerm::Const { value, width } => Some(truncate(*value, *width)),
        BvTerm::Binary { op, lhs, rhs } => {
            let width = lhs.width();
            Some(apply(*op, eval_term(lhs, env)?, eval_term(rhs, env)?, width))
        }
        BvTerm::Ite {
            cond,
            then,
            otherwise,
        } => {
            if eval_formula(cond, env)? {
                eval_term(then, env)
            } else {
                eval_term(otherwise, env)
            }
        }
    }
}

/// Evaluate a formula; `None` if it mentions an unassigned variable
pub fn eval_formula(formula: &Formula, env: &BitAssignment) -> Option<bool> {
    match formula {
        Formula::Compare { op, lhs, rhs } => Some(compare(
            *op,
            eval_term(lhs, env)?,
            eval_term(rhs, env)?,
            lhs.width(),
        )),
        Formula::Not(inner) => eval_formula(inner, env).map(|b| !b),
        Formula::And(parts) => {
            for part in parts {
                if !eval_formula(part, env)? {
                    return Some(false);
                }
            }
            Some(true)
        }
    }
}
