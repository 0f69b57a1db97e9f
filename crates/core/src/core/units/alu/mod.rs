//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer ALU. Every operation works on 32-bit two's
//! complement values and produces a result together with the N, V and Z condition
//! codes.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Mul, Div, Rem
//! - [`logic`]:      Or, And, Andn, Xor
//! - [`shifts`]:     Sll, Sra, Srl

/// Integer arithmetic operations (add, subtract, multiply, divide, remainder).
pub mod arithmetic;

/// Bitwise logical operations (or, and, andn, xor).
pub mod logic;

/// Shift operations (sll, sra, srl).
pub mod shifts;

use self::arithmetic::ArithOp;
use self::logic::LogicOp;
use self::shifts::ShiftOp;
use crate::core::arch::status::Flags;

/// Integer ALU operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Wrapping addition.
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Wrapping multiplication.
    Mul,
    /// Truncating signed division.
    Div,
    /// Signed remainder.
    Rem,
    /// Shift left logical.
    Sll,
    /// Shift right arithmetic.
    Sra,
    /// Shift right logical.
    Srl,
    /// Bitwise or.
    Or,
    /// Bitwise and.
    And,
    /// Bitwise and with the complement of the second operand.
    Andn,
    /// Bitwise exclusive or.
    Xor,
}

/// The value and condition codes produced by an ALU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AluResult {
    /// 32-bit result.
    pub value: i32,
    /// Condition codes.
    pub flags: Flags,
}

impl AluResult {
    /// Builds a result, deriving N and Z from the value.
    #[inline]
    pub const fn new(value: i32, overflow: bool) -> Self {
        Self {
            value,
            flags: Flags::of(value, overflow),
        }
    }
}

/// Arithmetic Logic Unit (ALU) for integer operations.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The ALU operation to perform
    /// * `a`  - First operand
    /// * `b`  - Second operand (shift amount for shifts)
    ///
    /// # Returns
    ///
    /// The result and flags, or `None` when dividing by zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use blitz_core::core::units::alu::{Alu, AluOp};
    ///
    /// let r = Alu::execute(AluOp::Add, i32::MAX, 1).unwrap();
    /// assert_eq!(r.value, i32::MIN);
    /// assert!(r.flags.v && r.flags.n && !r.flags.z);
    ///
    /// assert!(Alu::execute(AluOp::Div, 7, 0).is_none());
    /// ```
    pub fn execute(op: AluOp, a: i32, b: i32) -> Option<AluResult> {
        match op {
            AluOp::Add => arithmetic::execute(ArithOp::Add, a, b),
            AluOp::Sub => arithmetic::execute(ArithOp::Sub, a, b),
            AluOp::Mul => arithmetic::execute(ArithOp::Mul, a, b),
            AluOp::Div => arithmetic::execute(ArithOp::Div, a, b),
            AluOp::Rem => arithmetic::execute(ArithOp::Rem, a, b),
            AluOp::Or => Some(logic::execute(LogicOp::Or, a, b)),
            AluOp::And => Some(logic::execute(LogicOp::And, a, b)),
            AluOp::Andn => Some(logic::execute(LogicOp::Andn, a, b)),
            AluOp::Xor => Some(logic::execute(LogicOp::Xor, a, b)),
            AluOp::Sll => Some(shifts::execute(ShiftOp::Sll, a, b)),
            AluOp::Sra => Some(shifts::execute(ShiftOp::Sra, a, b)),
            AluOp::Srl => Some(shifts::execute(ShiftOp::Srl, a, b)),
        }
    }
}
