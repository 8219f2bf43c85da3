//! Solver Formula IR
//!
//! Fixed-width two's-complement terms and the boolean formulas built over
//! them. Every lowered predicate becomes a [`Formula`]; solver backends
//! translate this IR into their native representation.
//!
//! `Display` renders SMT-LIB 2 syntax:
//!
//! ```text
//! (bvsgt x #x00000005)
//! (distinct (bvor (ite (bvslt x #x00000000) #x00000001 #x00000000) ...) #x00000000)
//! ```

use std::fmt;

/// Bit mask covering `width` bits (1..=128)
pub fn mask(width: u32) -> u128 {
    if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// Two's-complement bit pattern of `value` at `width`
pub fn truncate(value: i128, width: u32) -> u128 {
    (value as u128) & mask(width)
}

/// Signed interpretation of a `width`-bit pattern
pub fn to_signed(bits: u128, width: u32) -> i128 {
    let bits = bits & mask(width);
    if width >= 128 {
        return bits as i128;
    }
    let sign = 1u128 << (width - 1);
    if bits & sign != 0 {
        (bits | !mask(width)) as i128
    } else {
        bits as i128
    }
}

/// Largest signed value at `width`
pub fn max_signed(width: u32) -> i128 {
    (mask(width) >> 1) as i128
}

/// Bit-vector operators (term → term)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BvOp {
    Add,
    Sub,
    Mul,
    /// Signed division, truncating
    SDiv,
    /// Signed remainder, sign of the dividend
    SRem,
    Shl,
    /// Arithmetic shift right
    AShr,
    Xor,
    Or,
    And,
}

impl BvOp {
    /// SMT-LIB function name
    pub fn smtlib(&self) -> &'static str {
        match self {
            Self::Add => "bvadd",
            Self::Sub => "bvsub",
            Self::Mul => "bvmul",
            Self::SDiv => "bvsdiv",
            Self::SRem => "bvsrem",
            Self::Shl => "bvshl",
            Self::AShr => "bvashr",
            Self::Xor => "bvxor",
            Self::Or => "bvor",
            Self::And => "bvand",
        }
    }
}

/// Signed comparisons (term × term → bool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BvCmp {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl BvCmp {
    /// Comparison with operands swapped: `a op b` iff `b op.flip() a`
    pub fn flip(&self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Slt => Self::Sgt,
            Self::Sle => Self::Sge,
            Self::Sgt => Self::Slt,
            Self::Sge => Self::Sle,
        }
    }

    /// Logical complement: `not (a op b)` iff `a op.complement() b`
    pub fn complement(&self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Slt => Self::Sge,
            Self::Sle => Self::Sgt,
            Self::Sgt => Self::Sle,
            Self::Sge => Self::Slt,
        }
    }

    /// SMT-LIB function name
    pub fn smtlib(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "distinct",
            Self::Slt => "bvslt",
            Self::Sle => "bvsle",
            Self::Sgt => "bvsgt",
            Self::Sge => "bvsge",
        }
    }
}

/// Bit-vector valued term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BvTerm {
    /// Declared solver variable
    Var { name: String, width: u32 },

    /// Constant, stored as its signed value at `width`
    Const { value: i128, width: u32 },

    /// `op lhs rhs`
    Binary {
        op: BvOp,
        lhs: Box<BvTerm>,
        rhs: Box<BvTerm>,
    },

    /// Boolean reified into a term: `cond ? then : otherwise`
    Ite {
        cond: Box<Formula>,
        then: Box<BvTerm>,
        otherwise: Box<BvTerm>,
    },
}

impl BvTerm {
    /// Variable term
    pub fn var(name: impl Into<String>, width: u32) -> Self {
        Self::Var {
            name: name.into(),
            width,
        }
    }

    /// Constant term; `value` wraps modulo 2^width
    pub fn constant(value: i128, width: u32) -> Self {
        Self::Const {
            value: to_signed(truncate(value, width), width),
            width,
        }
    }

    /// Binary term
    pub fn binary(op: BvOp, lhs: BvTerm, rhs: BvTerm) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// `cond ? 1 : 0` at `width`
    pub fn reify(cond: Formula, width: u32) -> Self {
        Self::Ite {
            cond: Box::new(cond),
            then: Box::new(Self::constant(1, width)),
            otherwise: Box::new(Self::constant(0, width)),
        }
    }

    /// Bit width of the term
    pub fn width(&self) -> u32 {
        match self {
            Self::Var { width, .. } | Self::Const { width, .. } => *width,
            Self::Binary { lhs, .. } => lhs.width(),
            Self::Ite { then, .. } => then.width(),
        }
    }
}

impl fmt::Display for BvTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var { name, .. } => write!(f, "{}", name),
            Self::Const { value, width } => {
                let bits = truncate(*value, *width);
                if width % 4 == 0 {
                    write!(f, "#x{:0w$x}", bits, w = (*width / 4) as usize)
                } else {
                    write!(f, "#b{:0w$b}", bits, w = *width as usize)
                }
            }
            Self::Binary { op, lhs, rhs } => write!(f, "({} {} {})", op.smtlib(), lhs, rhs),
            Self::Ite {
                cond,
                then,
                otherwise,
            } => write!(f, "(ite {} {} {})", cond, then, otherwise),
        }
    }
}

/// Boolean formula over bit-vector terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// `op lhs rhs`
    Compare {
        op: BvCmp,
        lhs: BvTerm,
        rhs: BvTerm,
    },

    /// Negation
    Not(Box<Formula>),

    /// Conjunction (empty is true)
    And(Vec<Formula>),
}

impl Formula {
    /// Comparison formula
    pub fn compare(op: BvCmp, lhs: BvTerm, rhs: BvTerm) -> Self {
        Self::Compare { op, lhs, rhs }
    }

    /// Negation, cancelling a double `not`
    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Variable names occurring in the formula, first occurrence order
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Compare { lhs, rhs, .. } => {
                collect_term_variables(lhs, out);
                collect_term_variables(rhs, out);
            }
            Self::Not(inner) => inner.collect_variables(out),
            Self::And(parts) => parts.iter().for_each(|p| p.collect_variables(out)),
        }
    }
}

fn collect_term_variables<'a>(term: &'a BvTerm, out: &mut Vec<&'a str>) {
    match term {
        BvTerm::Var { name, .. } => {
            if !out.contains(&name.as_str()) {
                out.push(name);
            }
        }
        BvTerm::Const { .. } => {}
        BvTerm::Binary { lhs, rhs, .. } => {
            collect_term_variables(lhs, out);
            collect_term_variables(rhs, out);
        }
        BvTerm::Ite {
            cond,
            then,
            otherwise,
        } => {
            cond.collect_variables(out);
            collect_term_variables(then, out);
            collect_term_variables(otherwise, out);
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { op, lhs, rhs } => write!(f, "({} {} {})", op.smtlib(), lhs, rhs),
            Self::Not(inner) => write!(f, "(not {})", inner),
            Self::And(parts) if parts.is_empty() => write!(f, "true"),
            Self::And(parts) => {
                write!(f, "(and")?;
                for part in parts {
                    write!(f, " {}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_roundtrip() {
        assert_eq!(to_signed(truncate(-1, 8), 8), -1);
        assert_eq!(to_signed(truncate(128, 8), 8), -128);
        assert_eq!(to_signed(truncate(i128::MIN, 128), 128), i128::MIN);
        assert_eq!(max_signed(32), i32::MAX as i128);
        assert_eq!(max_signed(128), i128::MAX);
    }

    #[test]
    fn test_constant_wraps() {
        assert_eq!(BvTerm::constant(1 << 31, 32), BvTerm::constant(-(1 << 31), 32));
        assert_eq!(
            BvTerm::constant(300, 8),
            BvTerm::Const {
                value: 44,
                width: 8
            }
        );
    }

    #[test]
    fn test_smtlib_rendering() {
        let x = BvTerm::var("x", 32);
        let f = Formula::compare(BvCmp::Sgt, x.clone(), BvTerm::constant(5, 32));
        assert_eq!(f.to_string(), "(bvsgt x #x00000005)");

        let reified = BvTerm::reify(f.clone(), 32);
        assert_eq!(
            reified.to_string(),
            "(ite (bvsgt x #x00000005) #x00000001 #x00000000)"
        );
        assert_eq!(f.negate().to_string(), "(not (bvsgt x #x00000005))");
        assert_eq!(Formula::And(vec![]).to_string(), "true");
        assert_eq!(BvTerm::constant(-1, 6).to_string(), "#b111111");
    }

    #[test]
    fn test_double_negation_cancels() {
        let f = Formula::compare(BvCmp::Eq, BvTerm::var("x", 8), BvTerm::constant(0, 8));
        assert_eq!(f.clone().negate().negate(), f);
    }

    #[test]
    fn test_variables_deduplicated() {
        let x = BvTerm::var("x", 8);
        let y = BvTerm::var("y", 8);
        let sum = BvTerm::binary(BvOp::Add, x.clone(), y);
        let f = Formula::And(vec![
            Formula::compare(BvCmp::Slt, sum, x.clone()),
            Formula::compare(BvCmp::Eq, BvTerm::reify(Formula::And(vec![]), 8), x),
        ]);
        assert_eq!(f.variables(), vec!["x", "y"]);
    }

    #[test]
    fn test_flip() {
        assert_eq!(BvCmp::Slt.flip(), BvCmp::Sgt);
        assert_eq!(BvCmp::Sge.flip(), BvCmp::Sle);
        assert_eq!(BvCmp::Ne.flip(), BvCmp::Ne);
        assert_eq!(BvCmp::Sle.complement(), BvCmp::Sgt);
        assert_eq!(BvCmp::Eq.complement(), BvCmp::Ne);
    }
}
