//! ALU shift operations.
//!
//! The shift amount is the low five bits of the second operand. V is always cleared.

use super::AluResult;

/// Shift operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOp {
    /// Shift left logical.
    Sll,
    /// Shift right arithmetic.
    Sra,
    /// Shift right logical.
    Srl,
}

/// Mask applied to the shift amount.
const SHAMT_MASK: i32 = 0x1F;

/// Executes a shift operation.
pub fn execute(op: ShiftOp, a: i32, b: i32) -> AluResult {
    let shamt = (b & SHAMT_MASK) as u32;
    let value = match op {
        ShiftOp::Sll => ((a as u32) << shamt) as i32,
        ShiftOp::Sra => a >> shamt,
        ShiftOp::Srl => ((a as u32) >> shamt) as i32,
    };
    AluResult::new(value, false)
}
