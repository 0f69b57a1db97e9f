//! Assembler expressions.
//!
//! An expression evaluates to a `Value`: an integer offset from a base. The base
//! is either nothing (an absolute number), the start of one of this file's
//! segments, or an imported symbol. Only `base + absolute`, `absolute + base` and
//! `base - absolute` keep a base; the difference of two values on the same base is
//! absolute. Everything else must be absolute on both sides.

use std::fmt;

use crate::object::Segment;

/// Binary operators, in source form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
}

/// An unevaluated expression tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// An integer or character literal.
    Int(i64),
    /// A symbol reference.
    Symbol(String),
    /// Unary minus.
    Neg(Box<Expr>),
    /// A binary operation.
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

/// What a value is relative to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Base {
    /// A plain number.
    Absolute,
    /// The start of a segment of the file being assembled.
    Segment(Segment),
    /// An imported symbol, by name.
    Import(String),
}

/// An evaluated expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value {
    /// What the offset is relative to.
    pub base: Base,
    /// Offset from the base.
    pub offset: i64,
}

impl Value {
    /// An absolute value.
    pub const fn absolute(offset: i64) -> Self {
        Self {
            base: Base::Absolute,
            offset,
        }
    }

    /// Whether the value is a plain number.
    pub const fn is_absolute(&self) -> bool {
        matches!(self.base, Base::Absolute)
    }
}

/// Why an expression could not be evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalError {
    /// A symbol with no definition yet.
    Undefined(String),
    /// An operator applied to relocatable operands it cannot combine.
    NotAbsolute(BinOp),
    /// Division or remainder by zero.
    DivideByZero,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined(name) => write!(f, "undefined symbol '{name}'"),
            Self::NotAbsolute(op) => {
                write!(f, "operands of {op:?} are not combinable relocatable values")
            }
            Self::DivideByZero => f.write_str("division by zero in expression"),
        }
    }
}

impl Expr {
    /// Evaluates the expression.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Resolves a symbol name to its current value, if defined.
    pub fn eval<F>(&self, lookup: &F) -> Result<Value, EvalError>
    where
        F: Fn(&str) -> Option<Value>,
    {
        match self {
            Self::Int(n) => Ok(Value::absolute(*n)),
            Self::Symbol(name) => lookup(name).ok_or_else(|| EvalError::Undefined(name.clone())),
            Self::Neg(inner) => {
                let v = inner.eval(lookup)?;
                if !v.is_absolute() {
                    return Err(EvalError::NotAbsolute(BinOp::Sub));
                }
                Ok(Value::absolute(v.offset.wrapping_neg()))
            }
            Self::Binary(op, lhs, rhs) => {
                let l = lhs.eval(lookup)?;
                let r = rhs.eval(lookup)?;
                combine(*op, l, r)
            }
        }
    }

    /// Every symbol name the expression mentions.
    pub fn symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Int(_) => {}
            Self::Symbol(name) => out.push(name),
            Self::Neg(inner) => inner.collect_symbols(out),
            Self::Binary(_, lhs, rhs) => {
                lhs.collect_symbols(out);
                rhs.collect_symbols(out);
            }
        }
    }
}

fn combine(op: BinOp, l: Value, r: Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => match (l.is_absolute(), r.is_absolute()) {
            (_, true) => Ok(Value {
                base: l.base,
                offset: l.offset.wrapping_add(r.offset),
            }),
            (true, false) => Ok(Value {
                base: r.base,
                offset: l.offset.wrapping_add(r.offset),
            }),
            (false, false) => Err(EvalError::NotAbsolute(op)),
        },
        BinOp::Sub => {
            if r.is_absolute() {
                Ok(Value {
                    base: l.base,
                    offset: l.offset.wrapping_sub(r.offset),
                })
            } else if l.base == r.base && !matches!(l.base, Base::Import(_)) {
                Ok(Value::absolute(l.offset.wrapping_sub(r.offset)))
            } else {
                Err(EvalError::NotAbsolute(op))
            }
        }
        BinOp::Mul | BinOp::Div | BinOp::Rem => {
            if !l.is_absolute() || !r.is_absolute() {
                return Err(EvalError::NotAbsolute(op));
            }
            let (a, b) = (l.offset, r.offset);
            let value = match op {
                BinOp::Mul => a.wrapping_mul(b),
                _ if b == 0 => return Err(EvalError::DivideByZero),
                BinOp::Div => a.wrapping_div(b),
                _ => a.wrapping_rem(b),
            };
            Ok(Value::absolute(value))
        }
    }
}
