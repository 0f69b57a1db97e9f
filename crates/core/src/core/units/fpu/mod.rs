//! Floating-Point Unit (FPU).
//!
//! All arithmetic is IEEE-754 double precision with the host's round-to-nearest
//! behavior; nothing traps except the float-to-integer conversion, which reports
//! NaN and out-of-range inputs so the engine can raise ARITHMETIC_EXCEPTION.

use crate::core::arch::status::Flags;

/// Binary floating-point operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FpuOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
}

/// Floating-Point Unit (FPU) for double-precision operations.
#[derive(Debug)]
pub struct Fpu;

impl Fpu {
    /// Executes a binary floating-point operation.
    #[inline]
    pub fn execute(op: FpuOp, a: f64, b: f64) -> f64 {
        match op {
            FpuOp::Add => a + b,
            FpuOp::Sub => a - b,
            FpuOp::Mul => a * b,
            FpuOp::Div => a / b,
        }
    }

    /// Compares two doubles: Z on equal, N on less, V on unordered.
    pub fn compare(a: f64, b: f64) -> Flags {
        if a.is_nan() || b.is_nan() {
            return Flags {
                n: false,
                v: true,
                z: false,
            };
        }
        Flags {
            n: a < b,
            v: false,
            z: a == b,
        }
    }

    /// Converts a signed integer to a double; always exact.
    #[inline]
    pub fn from_int(value: i32) -> f64 {
        f64::from(value)
    }

    /// Truncates a double toward zero.
    ///
    /// # Returns
    ///
    /// `None` when the input is NaN or the truncated value does not fit in `i32`.
    pub fn to_int(value: f64) -> Option<i32> {
        if value.is_nan() {
            return None;
        }
        let truncated = value.trunc();
        if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
            return None;
        }
        Some(truncated as i32)
    }

    /// Square root; negative inputs produce NaN.
    #[inline]
    pub fn sqrt(value: f64) -> f64 {
        value.sqrt()
    }

    /// Sign inversion.
    #[inline]
    pub fn neg(value: f64) -> f64 {
        -value
    }

    /// Absolute value.
    #[inline]
    pub fn abs(value: f64) -> f64 {
        value.abs()
    }
}
