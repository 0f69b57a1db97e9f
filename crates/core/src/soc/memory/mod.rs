//! Physical Memory.
//!
//! This module implements the machine's flat physical memory. It provides:
//! 1. **Storage:** A byte array of `memory_size` bytes holding words in canonical order.
//! 2. **Checked Access:** Word and byte accessors that reject unaligned or
//!    out-of-range addresses with a host-fatal error.
//! 3. **Locking:** The single global word lock used by page table updates and `tset`.
//!
//! Memory-mapped device registers are not handled here; see `soc::interconnect`.

use crate::common::endian::{word_from_bytes, word_to_bytes};
use crate::common::error::MachineError;

/// Flat physical memory with one word lock.
#[derive(Clone)]
pub struct PhysicalMemory {
    bytes: Vec<u8>,
    lock: Option<u32>,
}

impl std::fmt::Debug for PhysicalMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalMemory")
            .field("size", &self.bytes.len())
            .field("lock", &self.lock)
            .finish()
    }
}

impl PhysicalMemory {
    /// Creates zero-filled memory.
    ///
    /// # Arguments
    ///
    /// * `size` - Size in bytes.
    pub fn new(size: u32) -> Self {
        Self {
            bytes: vec![0; size as usize],
            lock: None,
        }
    }

    /// Memory size in bytes.
    #[inline]
    pub fn size(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Whether `addr` names a byte of memory.
    #[inline]
    pub fn contains(&self, addr: u32) -> bool {
        (addr as usize) < self.bytes.len()
    }

    fn check_word(&self, addr: u32) -> Result<usize, MachineError> {
        if addr % 4 != 0 {
            return Err(MachineError::UnalignedAccess { addr });
        }
        if (addr as usize) + 4 > self.bytes.len() {
            return Err(MachineError::AddressOutOfRange { addr });
        }
        Ok(addr as usize)
    }

    /// Reads a word.
    ///
    /// # Returns
    ///
    /// The value, or a host-fatal error for an unaligned or out-of-range address.
    #[inline]
    pub fn read_word(&self, addr: u32) -> Result<u32, MachineError> {
        let i = self.check_word(addr)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.bytes[i..i + 4]);
        Ok(word_from_bytes(raw))
    }

    /// Writes a word.
    #[inline]
    pub fn write_word(&mut self, addr: u32, value: u32) -> Result<(), MachineError> {
        let i = self.check_word(addr)?;
        self.bytes[i..i + 4].copy_from_slice(&word_to_bytes(value));
        Ok(())
    }

    /// Reads a byte.
    #[inline]
    pub fn read_byte(&self, addr: u32) -> Result<u8, MachineError> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(MachineError::AddressOutOfRange { addr })
    }

    /// Writes a byte.
    #[inline]
    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), MachineError> {
        let slot = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(MachineError::AddressOutOfRange { addr })?;
        *slot = value;
        Ok(())
    }

    /// Acquires the memory lock on `addr` and reads the word there.
    ///
    /// # Returns
    ///
    /// The word, or `DoubleLock` when the lock is already held.
    pub fn read_word_locked(&mut self, addr: u32) -> Result<u32, MachineError> {
        if let Some(held) = self.lock {
            return Err(MachineError::DoubleLock {
                held,
                requested: addr,
            });
        }
        let value = self.read_word(addr)?;
        self.lock = Some(addr);
        Ok(value)
    }

    /// Writes the locked word and releases the lock.
    pub fn write_word_and_unlock(&mut self, addr: u32, value: u32) -> Result<(), MachineError> {
        self.unlock(addr)?;
        self.write_word(addr, value)
    }

    /// Releases the lock held on `addr`.
    pub fn unlock(&mut self, addr: u32) -> Result<(), MachineError> {
        if self.lock != Some(addr) {
            return Err(MachineError::UnlockMismatch {
                held: self.lock,
                addr,
            });
        }
        self.lock = None;
        Ok(())
    }

    /// The address currently holding the lock, if any.
    #[inline]
    pub const fn locked_address(&self) -> Option<u32> {
        self.lock
    }

    /// Borrows a byte range.
    pub fn slice(&self, addr: u32, len: usize) -> Result<&[u8], MachineError> {
        let start = addr as usize;
        self.bytes
            .get(start..start + len)
            .ok_or(MachineError::AddressOutOfRange { addr })
    }

    /// Mutably borrows a byte range.
    pub fn slice_mut(&mut self, addr: u32, len: usize) -> Result<&mut [u8], MachineError> {
        let start = addr as usize;
        self.bytes
            .get_mut(start..start + len)
            .ok_or(MachineError::AddressOutOfRange { addr })
    }

    /// Copies `data` into memory at `addr`.
    pub fn load(&mut self, addr: u32, data: &[u8]) -> Result<(), MachineError> {
        self.slice_mut(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Drops the lock without writing.
    pub fn clear_lock(&mut self) {
        self.lock = None;
    }

    /// Zeroes all of memory and drops the lock.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.lock = None;
    }
}
