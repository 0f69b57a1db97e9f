//! BLITZ machine toolchain library.
//!
//! This crate implements the assembler, linker and emulator for the BLITZ 32-bit RISC
//! machine:
//! 1. **Core:** Register banks, status word, interrupt controller and the fetch/decode/execute engine.
//! 2. **Memory:** Physical memory with a word lock, page-table translation and MMIO dispatch.
//! 3. **ISA:** The opcode table, instruction decoding, encoding helpers and a disassembler.
//! 4. **SoC:** Serial and disk devices driven by a deterministic discrete-event scheduler.
//! 5. **Toolchain:** Object, executable and disk-image codecs, the linker and the assembler.
//! 6. **Simulation:** Executable loading, the run loop and statistics collection.

/// Assembler (lexer, parser, two-pass code generator).
pub mod asm;
/// Common types and constants (byte order, registers, interrupts, host errors).
pub mod common;
/// Emulator configuration (defaults, JSON loading, validation).
pub mod config;
/// CPU core (architectural state, execution engine, units).
pub mod core;
/// Instruction set (opcode table, decode, encode, disassembly).
pub mod isa;
/// Linker (global symbol table, fixed-point resolution, relocation patching).
pub mod link;
/// Binary file formats (object files, executables, disk images).
pub mod object;
/// Executable loading and the top-level simulator.
pub mod sim;
/// System-on-chip (physical memory, devices, event scheduler).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or load it from JSON.
pub use crate::config::Config;
/// Main CPU type; holds registers, status, the interrupt controller and the system.
pub use crate::core::Cpu;
/// Top-level simulator wrapping a `Cpu`.
pub use crate::sim::Simulator;
/// Memory, devices and scheduler; construct with `System::new`.
pub use crate::soc::System;
