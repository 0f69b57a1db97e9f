//! ALU arithmetic operations.
//!
//! Addition, subtraction and multiplication wrap and report signed overflow in V.
//! Multiplication overflow is detected by comparing the wrapped product with the
//! product computed in double precision, so very large products that round in f64
//! can be misreported; the hardware behaves the same way.

use super::AluResult;

/// Arithmetic operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
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
}

/// Executes an integer arithmetic operation.
///
/// # Returns
///
/// `None` for a zero divisor in `Div` or `Rem`.
pub fn execute(op: ArithOp, a: i32, b: i32) -> Option<AluResult> {
    match op {
        ArithOp::Add => {
            let (value, overflow) = a.overflowing_add(b);
            Some(AluResult::new(value, overflow))
        }
        ArithOp::Sub => {
            let (value, overflow) = a.overflowing_sub(b);
            Some(AluResult::new(value, overflow))
        }
        ArithOp::Mul => {
            let value = a.wrapping_mul(b);
            let exact = f64::from(a) * f64::from(b);
            Some(AluResult::new(value, exact != f64::from(value)))
        }
        ArithOp::Div => {
            if b == 0 {
                return None;
            }
            if a == i32::MIN && b == -1 {
                return Some(AluResult::new(i32::MIN, true));
            }
            Some(AluResult::new(a / b, false))
        }
        ArithOp::Rem => {
            if b == 0 {
                return None;
            }
            if a == i32::MIN && b == -1 {
                return Some(AluResult::new(0, true));
            }
            Some(AluResult::new(a % b, false))
        }
    }
}
