//! Translated memory access.
//!
//! Every instruction-level load and store goes through these helpers: translate the
//! logical address with the current paging state, then touch the bus. Byte accesses
//! translate the containing word and adjust the physical address afterwards.

use super::Cpu;
use crate::common::error::Trap;
use crate::core::units::mmu::{self, Access};

impl Cpu {
    /// Translates a logical word address with the CPU's paging state.
    ///
    /// # Arguments
    ///
    /// * `addr` - Logical address.
    /// * `access` - Access kind and options.
    ///
    /// # Returns
    ///
    /// The physical address, or the trap to report.
    #[inline]
    pub fn translate(&mut self, addr: u32, access: Access) -> Result<u32, Trap> {
        let ctx = self.translation_context();
        mmu::translate(&mut self.bus, &ctx, addr, access)
    }

    fn access(write: bool, force: bool) -> Access {
        let access = if write { Access::WRITE } else { Access::READ };
        if force { access.forced() } else { access }
    }

    /// Loads a word.
    pub fn load_word(&mut self, addr: u32, force_paging: bool) -> Result<u32, Trap> {
        let physical = self.translate(addr, Self::access(false, force_paging))?;
        Ok(self.bus.read_word(physical)?)
    }

    /// Stores a word.
    pub fn store_word(&mut self, addr: u32, value: u32, force_paging: bool) -> Result<(), Trap> {
        let physical = self.translate(addr, Self::access(true, force_paging))?;
        self.bus.write_word(physical, value)?;
        Ok(())
    }

    /// Loads a byte, zero-extended.
    pub fn load_byte(&mut self, addr: u32, force_paging: bool) -> Result<u32, Trap> {
        let physical = self.translate(addr & !3, Self::access(false, force_paging))?;
        Ok(u32::from(self.bus.read_byte(physical | (addr & 3))?))
    }

    /// Stores the low byte of `value`.
    pub fn store_byte(&mut self, addr: u32, value: u32, force_paging: bool) -> Result<(), Trap> {
        let physical = self.translate(addr & !3, Self::access(true, force_paging))?;
        self.bus.write_byte(physical | (addr & 3), value as u8)?;
        Ok(())
    }

    /// Reads a word without side effects for the monitor and the disassembler.
    ///
    /// Returns `None` when the address does not translate or does not name a word
    /// of physical memory.
    pub fn peek_word(&mut self, addr: u32) -> Option<u32> {
        let physical = self.translate(addr, Access::PROBE).ok()?;
        self.bus.memory.read_word(physical).ok()
    }
}
