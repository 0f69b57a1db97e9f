//! Common utilities and types used throughout the BLITZ toolchain.
//!
//! This module provides the fundamental building blocks shared by the emulator, the
//! linker and the assembler:
//! 1. **Constants:** Page geometry, register counts and instruction size.
//! 2. **Byte Order:** The canonical big-endian word conversion and its host check.
//! 3. **Errors:** Guest interrupt classes, guest faults and host-fatal machine errors.
//! 4. **Registers:** The banked integer register file and the floating register bank.
//! 5. **Diagnostics:** File/line tagged messages produced by the assembler and linker.

/// Common constants used throughout the toolchain.
pub mod constants;

/// Source diagnostics shared by the assembler and linker.
pub mod diagnostic;

/// Canonical byte order conversion.
pub mod endian;

/// Interrupt classes, guest faults and host-fatal errors.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use constants::{PAGE_SHIFT, PAGE_SIZE};
pub use diagnostic::Diagnostic;
pub use error::{Fault, Interrupt, MachineError, Trap};
pub use reg::RegisterFile;
