//! BLITZ Assembler.
//!
//! Translates one source file into a relocatable object file. The pipeline is:
//! 1. **Lexing:** `logos` tokens, one vector per source line.
//! 2. **Parsing:** Each line becomes an optional label plus a directive, equate or
//!    instruction.
//! 3. **Pass One:** Sizes every statement and defines labels, imports and equates.
//! 4. **Pass Two:** Evaluates operands, emits bytes and records a relocation for each
//!    value that is relative to a segment or an import.
//!
//! Errors are collected with their source lines and assembly keeps going; any error
//! suppresses the object file. Warnings never do.

/// Two-pass code generation.
pub mod codegen;

/// Assembler errors.
pub mod error;

/// Expressions and their relocatable values.
pub mod expr;

/// Tokenizer.
pub mod lex;

/// Line parser.
pub mod parse;

pub use codegen::{Assembly, assemble};
pub use error::AsmError;

/// Label that marks the program entry point.
pub const ENTRY_LABEL: &str = "_entry";
