//! BLITZ Instruction Decoder.
//!
//! Splits a 32-bit word into its opcode table row and operand fields. Decoding is
//! total: an unassigned opcode byte yields `None`, which the engine reports as
//! ILLEGAL_INSTRUCTION.

use super::instruction::InstructionBits;
use super::opcodes::{self, OpcodeInfo};

/// A decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// Raw instruction word.
    pub word: u32,
    /// Table row for the opcode.
    pub info: &'static OpcodeInfo,
    /// `rc` field.
    pub rc: usize,
    /// `ra` field.
    pub ra: usize,
    /// `rb` field.
    pub rb: usize,
    /// Sign-extended 16-bit immediate.
    pub imm16: i32,
    /// Sign-extended 24-bit immediate.
    pub imm24: i32,
}

/// Decodes an instruction word.
///
/// # Examples
///
/// ```
/// use blitz_core::isa::decode;
///
/// // add r1, 5, r2  (format E)
/// let d = decode(0x8021_0005).unwrap();
/// assert_eq!(d.info.mnemonic, "add");
/// assert_eq!((d.rc, d.ra, d.imm16), (2, 1, 5));
/// assert!(decode(0xFF00_0000).is_none());
/// ```
#[inline]
pub fn decode(word: u32) -> Option<Decoded> {
    let info = opcodes::lookup(word.opcode())?;
    Some(Decoded {
        word,
        info,
        rc: word.rc(),
        ra: word.ra(),
        rb: word.rb(),
        imm16: word.imm16(),
        imm24: word.imm24(),
    })
}
