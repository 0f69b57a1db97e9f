/// Integer arithmetic and condition codes.
pub mod alu;

/// Floating point conversions and comparisons.
pub mod fpu;

/// Address translation.
pub mod mmu;
