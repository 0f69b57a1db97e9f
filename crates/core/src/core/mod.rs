//! Core processor implementation.
//!
//! This module contains the CPU implementation including its architectural state,
//! the execution units used by the instruction engine, and the orchestrator that
//! drives one machine cycle at a time.

/// Architecture-specific components (status word, modes, interrupt controller).
pub mod arch;

/// CPU core implementation and execution orchestration.
pub mod cpu;

/// Execution units (ALU, FPU, MMU).
pub mod units;

pub use self::cpu::Cpu;
