//! Memory-mapped I/O routing.
//!
//! This module routes physical accesses either to memory or to a device register.
//! It provides:
//! 1. **Word Access:** Addresses inside the MMIO window map to the serial and disk
//!    registers named by the configuration; other window words read 0.
//! 2. **Byte Access:** Bytes inside the window are not device-accessible; they read
//!    0 and writes are dropped.
//! 3. **Busy Checks:** Disk registers written while a command is in flight are
//!    rejected and request a halt.
//!
//! Every misuse is reported with `tracing` and never reaches the guest.

use tracing::{error, warn};

use super::System;
use crate::common::error::MachineError;

impl System {
    /// Reads a word from memory or a device register.
    pub fn read_word(&mut self, addr: u32) -> Result<u32, MachineError> {
        if !self.map.in_mmio_window(addr) {
            return self.memory.read_word(addr);
        }
        let map = self.map;
        let value = if addr == map.serial_status_addr {
            self.serial.status()
        } else if addr == map.serial_data_addr {
            self.serial.read_data()
        } else if addr == map.disk_status_addr {
            self.disk.status() as u32
        } else if addr == map.disk_memory_addr {
            self.disk.memory_addr
        } else if addr == map.disk_sector_addr {
            self.disk.sector
        } else if addr == map.disk_count_addr {
            self.disk.count
        } else {
            warn!(
                addr = format_args!("{addr:#010x}"),
                "read of unmapped MMIO word"
            );
            0
        };
        Ok(value)
    }

    /// Writes a word to memory or a device register.
    pub fn write_word(&mut self, addr: u32, value: u32) -> Result<(), MachineError> {
        if !self.map.in_mmio_window(addr) {
            return self.memory.write_word(addr, value);
        }
        let map = self.map;
        if addr == map.serial_data_addr {
            if self.serial.write_data(value) {
                self.scheduler.serial_out = self
                    .scheduler
                    .after(self.timing.serial_out_delay, self.timing.serial_out_jitter);
            }
        } else if addr == map.disk_command_addr {
            if self.reject_if_disk_busy("command") {
                return Ok(());
            }
            let memory_size = self.memory.size();
            self.disk
                .start(value, memory_size, &self.timing, &mut self.scheduler);
        } else if addr == map.disk_memory_addr {
            if !self.reject_if_disk_busy("memory address") {
                self.disk.memory_addr = value;
            }
        } else if addr == map.disk_sector_addr {
            if !self.reject_if_disk_busy("sector") {
                self.disk.sector = value;
            }
        } else if addr == map.disk_count_addr {
            if !self.reject_if_disk_busy("count") {
                self.disk.count = value;
            }
        } else {
            warn!(
                addr = format_args!("{addr:#010x}"),
                value, "write to read-only or unmapped MMIO word ignored"
            );
        }
        Ok(())
    }

    /// Reads a byte; window bytes read 0.
    pub fn read_byte(&mut self, addr: u32) -> Result<u8, MachineError> {
        if self.map.in_mmio_window(addr) {
            warn!(addr = format_args!("{addr:#010x}"), "byte read in MMIO window");
            return Ok(0);
        }
        self.memory.read_byte(addr)
    }

    /// Writes a byte; window bytes are dropped.
    pub fn write_byte(&mut self, addr: u32, value: u8) -> Result<(), MachineError> {
        if self.map.in_mmio_window(addr) {
            warn!(
                addr = format_args!("{addr:#010x}"),
                value, "byte write in MMIO window ignored"
            );
            return Ok(());
        }
        self.memory.write_byte(addr, value)
    }

    fn reject_if_disk_busy(&mut self, register: &str) -> bool {
        if !self.disk.is_busy() {
            return false;
        }
        error!(register, "disk register written while the disk is busy");
        self.request_halt();
        true
    }
}
