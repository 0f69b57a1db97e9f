//! Execution units and functional components.
//!
//! This module contains the processor execution units: the integer ALU, the
//! floating-point unit and the address translation unit.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Floating-Point Unit for IEEE 754 double operations.
pub mod fpu;

/// Address translation through the page table.
pub mod mmu;
