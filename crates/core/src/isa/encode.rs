//! Instruction word construction.
//!
//! The inverse of `decode`: fields a format does not use are left zero so that
//! relocation targets start out clear.

use super::instruction::{
    IMM16_MASK, IMM24_MASK, OPCODE_SHIFT, RA_SHIFT, RB_SHIFT, RC_SHIFT, REG_MASK,
};
use super::opcodes::{Format, OpcodeInfo};

/// Operand values for one instruction; unused fields are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Operands {
    /// `rc` field.
    pub rc: usize,
    /// `ra` field.
    pub ra: usize,
    /// `rb` field.
    pub rb: usize,
    /// Immediate (16 or 24 bits, truncated).
    pub imm: i32,
}

/// Builds the instruction word for `info` with the given operands.
pub fn encode(info: &OpcodeInfo, ops: Operands) -> u32 {
    let reg = |r: usize, shift: u32| ((r as u32) & REG_MASK) << shift;
    let mut word = u32::from(info.code) << OPCODE_SHIFT;
    match info.format {
        Format::A => {}
        Format::B => word |= reg(ops.rc, RC_SHIFT),
        Format::C => word |= reg(ops.rc, RC_SHIFT) | reg(ops.ra, RA_SHIFT),
        Format::D => {
            word |= reg(ops.rc, RC_SHIFT) | reg(ops.ra, RA_SHIFT) | reg(ops.rb, RB_SHIFT);
        }
        Format::E => {
            word |= reg(ops.rc, RC_SHIFT) | reg(ops.ra, RA_SHIFT) | (ops.imm as u32 & IMM16_MASK);
        }
        Format::F => word |= ops.imm as u32 & IMM24_MASK,
        Format::G => word |= reg(ops.rc, RC_SHIFT) | (ops.imm as u32 & IMM16_MASK),
    }
    word
}

/// Whether `value` fits a signed field of `bits` bits.
pub const fn fits_signed(value: i64, bits: u32) -> bool {
    let limit = 1i64 << (bits - 1);
    value >= -limit && value < limit
}

/// Whether `value` fits a 16-bit field read either as signed or unsigned.
pub const fn fits_16(value: i64) -> bool {
    value >= -0x8000 && value <= 0xFFFF
}
