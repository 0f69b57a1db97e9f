//! Global Machine Constants.
//!
//! This module defines the architectural constants shared across the toolchain:
//! 1. **Memory Constants:** Page size, shifts and masks used by the translation unit.
//! 2. **Register Constants:** Bank sizes and the conventional stack pointer.
//! 3. **Instruction Constants:** Instruction width and field positions.
//! 4. **Simulation Constants:** Scheduler sentinels and disk geometry.

/// Page size in bytes (8 KiB).
pub const PAGE_SIZE: u32 = 8192;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u32 = 13;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: u32 = PAGE_SIZE - 1;

/// Logical addresses with any of these bits set are outside the paged address space.
pub const LOGICAL_ADDRESS_LIMIT_MASK: u32 = 0xFF00_0000;

/// Size of a machine word in bytes.
pub const WORD_SIZE: u32 = 4;

/// Size of every instruction in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Number of integer registers in each bank.
pub const NUM_REGISTERS: usize = 16;

/// Number of floating-point registers.
pub const NUM_FLOAT_REGISTERS: usize = 16;

/// Register used as the stack pointer by `call`, `ret`, `push`, `pop` and interrupt entry.
pub const STACK_POINTER: usize = 15;

/// Disk sector size in bytes (one page).
pub const SECTOR_SIZE: u32 = PAGE_SIZE;

/// Sectors on one simulated disk track; seek time applies when the track changes.
pub const SECTORS_PER_TRACK: u32 = 16;

/// Scheduler sentinel meaning "no event scheduled".
pub const NEVER: u64 = u64::MAX;

/// Rounds `value` up to the next multiple of `align` (a power of two).
pub const fn align_up(value: u32, align: u32) -> u32 {
    (value + align - 1) & !(align - 1)
}
