//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the opcode table, field extraction, decoding, encoding and disassembly
//! for the BLITZ instruction set.
//!
//! # Formats
//!
//! Every instruction is one 32-bit word with the opcode in bits 31..24.
//!
//! * `A`: no operands.
//! * `B`: `rc`.
//! * `C`: `rc`, `ra`.
//! * `D`: `rc`, `ra`, `rb`.
//! * `E`: `rc`, `ra`, 16-bit immediate.
//! * `F`: 24-bit immediate.
//! * `G`: `rc`, 16-bit immediate.

/// Instruction decoding into a structured form.
pub mod decode;

/// Instruction disassembler for tracing and the monitor.
pub mod disasm;

/// Instruction word construction.
pub mod encode;

/// Instruction field extraction.
pub mod instruction;

/// The opcode table.
pub mod opcodes;

pub use decode::{Decoded, decode};
pub use opcodes::{Format, Op, OpcodeInfo};
