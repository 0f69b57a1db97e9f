//! Instruction field extraction.
//!
//! Provides bit extraction for the fields shared by every format. Fields a format
//! does not use simply read whatever bits are there.

/// Bit shift of the opcode field (bits 31-24).
pub const OPCODE_SHIFT: u32 = 24;
/// Bit shift of the `rc` field (bits 23-20).
pub const RC_SHIFT: u32 = 20;
/// Bit shift of the `ra` field (bits 19-16).
pub const RA_SHIFT: u32 = 16;
/// Bit shift of the `rb` field (bits 15-12).
pub const RB_SHIFT: u32 = 12;
/// Mask of a register field after shifting.
pub const REG_MASK: u32 = 0xF;
/// Mask of the 16-bit immediate.
pub const IMM16_MASK: u32 = 0xFFFF;
/// Mask of the 24-bit immediate.
pub const IMM24_MASK: u32 = 0x00FF_FFFF;

/// Field accessors on a raw instruction word.
pub trait InstructionBits {
    /// Opcode byte (bits 31-24).
    fn opcode(&self) -> u8;

    /// Destination / first register field (bits 23-20).
    fn rc(&self) -> usize;

    /// Source register field (bits 19-16).
    fn ra(&self) -> usize;

    /// Second source register field (bits 15-12).
    fn rb(&self) -> usize;

    /// Sign-extended 16-bit immediate (bits 15-0).
    fn imm16(&self) -> i32;

    /// Sign-extended 24-bit immediate (bits 23-0).
    fn imm24(&self) -> i32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u8 {
        (self >> OPCODE_SHIFT) as u8
    }

    #[inline(always)]
    fn rc(&self) -> usize {
        ((self >> RC_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn ra(&self) -> usize {
        ((self >> RA_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rb(&self) -> usize {
        ((self >> RB_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn imm16(&self) -> i32 {
        i32::from((self & IMM16_MASK) as u16 as i16)
    }

    #[inline(always)]
    fn imm24(&self) -> i32 {
        ((self << 8) as i32) >> 8
    }
}
