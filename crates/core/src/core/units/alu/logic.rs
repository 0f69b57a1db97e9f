//! ALU bitwise logical operations. V is always cleared.

use super::AluResult;

/// Bitwise operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicOp {
    /// Bitwise or.
    Or,
    /// Bitwise and.
    And,
    /// Bitwise and with the complement of the second operand.
    Andn,
    /// Bitwise exclusive or.
    Xor,
}

/// Executes a bitwise logical operation.
pub fn execute(op: LogicOp, a: i32, b: i32) -> AluResult {
    let value = match op {
        LogicOp::Or => a | b,
        LogicOp::And => a & b,
        LogicOp::Andn => a & !b,
        LogicOp::Xor => a ^ b,
    };
    AluResult::new(value, false)
}
