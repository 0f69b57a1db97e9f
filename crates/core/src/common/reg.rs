//! Banked Register File.
//!
//! This module provides the `RegisterFile` struct holding all architectural registers.
//! It provides:
//! 1. **Banked Storage:** A user and a system bank of sixteen 32-bit integer registers.
//! 2. **Float Storage:** One bank of sixteen IEEE-754 doubles shared by both modes.
//! 3. **Observability:** Dumping register state for the monitor and tests.
//!
//! No register is hardwired; `r0` stores whatever is written to it.

use crate::common::constants::{NUM_FLOAT_REGISTERS, NUM_REGISTERS};
use crate::core::arch::mode::Mode;

/// Integer register banks and the floating register bank.
#[derive(Clone, Debug, Default)]
pub struct RegisterFile {
    user: [u32; NUM_REGISTERS],
    system: [u32; NUM_REGISTERS],
    float: [f64; NUM_FLOAT_REGISTERS],
}

impl RegisterFile {
    /// Creates a register file with every register zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads an integer register from the bank selected by `mode`.
    ///
    /// # Arguments
    ///
    /// * `mode` - Bank to read.
    /// * `idx` - Register index (0-15).
    #[inline]
    pub fn read(&self, mode: Mode, idx: usize) -> u32 {
        match mode {
            Mode::User => self.user[idx & 0xF],
            Mode::System => self.system[idx & 0xF],
        }
    }

    /// Writes an integer register in the bank selected by `mode`.
    ///
    /// # Arguments
    ///
    /// * `mode` - Bank to write.
    /// * `idx` - Register index (0-15).
    /// * `val` - The 32-bit value to write.
    #[inline]
    pub fn write(&mut self, mode: Mode, idx: usize, val: u32) {
        match mode {
            Mode::User => self.user[idx & 0xF] = val,
            Mode::System => self.system[idx & 0xF] = val,
        }
    }

    /// Reads a floating-point register.
    #[inline]
    pub fn read_f(&self, idx: usize) -> f64 {
        self.float[idx & 0xF]
    }

    /// Writes a floating-point register.
    #[inline]
    pub fn write_f(&mut self, idx: usize, val: f64) {
        self.float[idx & 0xF] = val;
    }

    /// Zeroes every register.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Dumps the bank for `mode` and the float bank to stdout.
    pub fn dump(&self, mode: Mode) {
        let bank = match mode {
            Mode::User => &self.user,
            Mode::System => &self.system,
        };
        println!("{} registers:", mode);
        for row in 0..(NUM_REGISTERS / 4) {
            let base = row * 4;
            println!(
                "  r{:<2} = {:#010x}  r{:<2} = {:#010x}  r{:<2} = {:#010x}  r{:<2} = {:#010x}",
                base,
                bank[base],
                base + 1,
                bank[base + 1],
                base + 2,
                bank[base + 2],
                base + 3,
                bank[base + 3]
            );
        }
        for row in 0..(NUM_FLOAT_REGISTERS / 4) {
            let base = row * 4;
            println!(
                "  f{:<2} = {:<14e} f{:<2} = {:<14e} f{:<2} = {:<14e} f{:<2} = {:<14e}",
                base,
                self.float[base],
                base + 1,
                self.float[base + 1],
                base + 2,
                self.float[base + 2],
                base + 3,
                self.float[base + 3]
            );
        }
    }
}
