//! Configuration system for the BLITZ emulator.
//!
//! This module defines the configuration structures used to parameterize the machine.
//! It provides:
//! 1. **Defaults:** Baseline device timings, memory size and the MMIO register map.
//! 2. **Structures:** Hierarchical config for general options, device timing and memory.
//! 3. **Validation:** Rejection of memory maps and timings the emulator cannot honour.
//!
//! Configuration is supplied as JSON (every field optional) or via `Config::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::common::constants::PAGE_SIZE;

/// Default configuration constants for the emulator.
///
/// These values define the baseline machine when not explicitly overridden in a
/// JSON configuration file.
mod defaults {
    /// Cycles between host keyboard polls.
    pub const KEYBOARD_WAIT: u64 = 30_000;

    /// Random jitter added to each keyboard poll.
    pub const KEYBOARD_JITTER: u64 = 100;

    /// Cycles needed to transmit one serial character.
    pub const SERIAL_OUT_DELAY: u64 = 100;

    /// Random jitter added to each serial transmission.
    pub const SERIAL_OUT_JITTER: u64 = 10;

    /// Cycles between timer interrupts.
    pub const TIMER_QUANTUM: u64 = 5_000;

    /// Random jitter added to each timer period.
    pub const TIMER_JITTER: u64 = 30;

    /// Cycles to move the disk head to another track.
    pub const DISK_SEEK_TIME: u64 = 10_000;

    /// Cycles for the head to settle after any command.
    pub const DISK_SETTLE_TIME: u64 = 1_000;

    /// Cycles to pass one sector under the head.
    pub const DISK_ROTATIONAL_DELAY: u64 = 1_000;

    /// Random jitter added to each disk command.
    pub const DISK_JITTER: u64 = 10;

    /// Largest accepted timing value, in cycles.
    pub const MAX_TIMING: u64 = u32::MAX as u64;

    /// Error rates are per million commands.
    pub const MAX_ERROR_PPM: u32 = 1_000_000;

    /// Seed of the Park-Miller generator.
    pub const RANDOM_SEED: u32 = 1_234_567;

    /// Physical memory size (16 MiB).
    pub const MEMORY_SIZE: u32 = 16 * 1024 * 1024;

    /// First byte of the memory-mapped I/O window.
    pub const MMIO_LOW: u32 = 0x00FF_FF00;

    /// Last byte of the memory-mapped I/O window.
    pub const MMIO_HIGH: u32 = 0x00FF_FFFF;

    /// Serial status register.
    pub const SERIAL_STATUS_ADDR: u32 = 0x00FF_FF00;

    /// Serial data register.
    pub const SERIAL_DATA_ADDR: u32 = 0x00FF_FF04;

    /// Disk status register (read side of the shared status/command word).
    pub const DISK_STATUS_ADDR: u32 = 0x00FF_FF08;

    /// Disk command register (write side of the shared status/command word).
    pub const DISK_COMMAND_ADDR: u32 = 0x00FF_FF08;

    /// Disk transfer memory address register.
    pub const DISK_MEMORY_ADDR: u32 = 0x00FF_FF0C;

    /// Disk starting sector register.
    pub const DISK_SECTOR_ADDR: u32 = 0x00FF_FF10;

    /// Disk sector count register.
    pub const DISK_COUNT_ADDR: u32 = 0x00FF_FF14;
}

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for this schema.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The values are well formed but describe an impossible machine.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration structure for the emulator.
///
/// # Examples
///
/// ```
/// use blitz_core::config::Config;
///
/// let config = Config::from_json(r#"{ "timing": { "timer_quantum": 0 } }"#).unwrap();
/// assert_eq!(config.timing.timer_quantum, 0);
/// assert_eq!(config.memory.memory_size, 16 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General emulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Device timing parameters
    #[serde(default)]
    pub timing: TimingConfig,
    /// Physical memory and MMIO register map
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of a JSON configuration file.
    ///
    /// # Returns
    ///
    /// The validated configuration, or the first problem found.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks the memory map and the device timings.
    ///
    /// Memory size must be a positive multiple of the page size, the MMIO window must
    /// lie inside memory, and every device register must be word aligned, inside the
    /// window and distinct from the others (disk status and command may share a word).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mem = &self.memory;
        if mem.memory_size == 0 || mem.memory_size % PAGE_SIZE != 0 {
            return Err(ConfigError::Invalid(format!(
                "memory_size {:#x} must be a positive multiple of {:#x}",
                mem.memory_size, PAGE_SIZE
            )));
        }
        if mem.mmio_low > mem.mmio_high || mem.mmio_high >= mem.memory_size {
            return Err(ConfigError::Invalid(format!(
                "MMIO window {:#010x}..={:#010x} must lie inside memory",
                mem.mmio_low, mem.mmio_high
            )));
        }

        self.timing.validate()?;

        let registers = mem.registers();
        for (name, addr) in registers {
            if addr % 4 != 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} address {addr:#010x} is not word aligned"
                )));
            }
            if addr < mem.mmio_low || addr > mem.mmio_high {
                return Err(ConfigError::Invalid(format!(
                    "{name} address {addr:#010x} is outside the MMIO window"
                )));
            }
        }
        for (i, (name_a, addr_a)) in registers.iter().enumerate() {
            for (name_b, addr_b) in registers.iter().skip(i + 1) {
                let shared_disk_word = *name_a == "disk_status" && *name_b == "disk_command";
                if addr_a == addr_b && !shared_disk_word {
                    return Err(ConfigError::Invalid(format!(
                        "{name_a} and {name_b} share address {addr_a:#010x}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// General emulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Emit a `trace!` line for every executed instruction
    #[serde(default)]
    pub trace_instructions: bool,

    /// Seed of the pseudo-random jitter generator
    #[serde(default = "GeneralConfig::default_random_seed")]
    pub random_seed: u32,

    /// Block on host input instead of halting when `wait` finds nothing scheduled
    #[serde(default)]
    pub wait_for_input: bool,
}

impl GeneralConfig {
    /// Returns the default generator seed.
    fn default_random_seed() -> u32 {
        defaults::RANDOM_SEED
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            random_seed: defaults::RANDOM_SEED,
            wait_for_input: false,
        }
    }
}

/// Device timing parameters, in simulated cycles.
///
/// Every delay is `base + random_between(0, jitter)`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Cycles between host keyboard polls
    #[serde(default = "TimingConfig::default_keyboard_wait")]
    pub keyboard_wait: u64,

    /// Jitter added to each keyboard poll
    #[serde(default = "TimingConfig::default_keyboard_jitter")]
    pub keyboard_jitter: u64,

    /// Cycles to transmit one serial character
    #[serde(default = "TimingConfig::default_serial_out_delay")]
    pub serial_out_delay: u64,

    /// Jitter added to each serial transmission
    #[serde(default = "TimingConfig::default_serial_out_jitter")]
    pub serial_out_jitter: u64,

    /// Cycles between timer interrupts; 0 disables the timer
    #[serde(default = "TimingConfig::default_timer_quantum")]
    pub timer_quantum: u64,

    /// Jitter added to each timer period
    #[serde(default = "TimingConfig::default_timer_jitter")]
    pub timer_jitter: u64,

    /// Cycles to seek to another track
    #[serde(default = "TimingConfig::default_disk_seek_time")]
    pub disk_seek_time: u64,

    /// Cycles for the head to settle after a command
    #[serde(default = "TimingConfig::default_disk_settle_time")]
    pub disk_settle_time: u64,

    /// Cycles per transferred sector
    #[serde(default = "TimingConfig::default_disk_rotational_delay")]
    pub disk_rotational_delay: u64,

    /// Jitter added to each disk command
    #[serde(default = "TimingConfig::default_disk_jitter")]
    pub disk_jitter: u64,

    /// Simulated read failures per million commands
    #[serde(default)]
    pub disk_read_error_ppm: u32,

    /// Simulated write failures per million commands
    #[serde(default)]
    pub disk_write_error_ppm: u32,
}

impl TimingConfig {
    /// Rejects timings too large to schedule and error rates above one million.
    fn validate(&self) -> Result<(), ConfigError> {
        let cycles = [
            ("keyboard_wait", self.keyboard_wait),
            ("keyboard_jitter", self.keyboard_jitter),
            ("serial_out_delay", self.serial_out_delay),
            ("serial_out_jitter", self.serial_out_jitter),
            ("timer_quantum", self.timer_quantum),
            ("timer_jitter", self.timer_jitter),
            ("disk_seek_time", self.disk_seek_time),
            ("disk_settle_time", self.disk_settle_time),
            ("disk_rotational_delay", self.disk_rotational_delay),
            ("disk_jitter", self.disk_jitter),
        ];
        for (name, value) in cycles {
            if value > defaults::MAX_TIMING {
                return Err(ConfigError::Invalid(format!(
                    "{name} {value} exceeds {} cycles",
                    defaults::MAX_TIMING
                )));
            }
        }
        for (name, ppm) in [
            ("disk_read_error_ppm", self.disk_read_error_ppm),
            ("disk_write_error_ppm", self.disk_write_error_ppm),
        ] {
            if ppm > defaults::MAX_ERROR_PPM {
                return Err(ConfigError::Invalid(format!(
                    "{name} {ppm} exceeds one million"
                )));
            }
        }
        Ok(())
    }

    fn default_keyboard_wait() -> u64 {
        defaults::KEYBOARD_WAIT
    }

    fn default_keyboard_jitter() -> u64 {
        defaults::KEYBOARD_JITTER
    }

    fn default_serial_out_delay() -> u64 {
        defaults::SERIAL_OUT_DELAY
    }

    fn default_serial_out_jitter() -> u64 {
        defaults::SERIAL_OUT_JITTER
    }

    fn default_timer_quantum() -> u64 {
        defaults::TIMER_QUANTUM
    }

    fn default_timer_jitter() -> u64 {
        defaults::TIMER_JITTER
    }

    fn default_disk_seek_time() -> u64 {
        defaults::DISK_SEEK_TIME
    }

    fn default_disk_settle_time() -> u64 {
        defaults::DISK_SETTLE_TIME
    }

    fn default_disk_rotational_delay() -> u64 {
        defaults::DISK_ROTATIONAL_DELAY
    }

    fn default_disk_jitter() -> u64 {
        defaults::DISK_JITTER
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            keyboard_wait: defaults::KEYBOARD_WAIT,
            keyboard_jitter: defaults::KEYBOARD_JITTER,
            serial_out_delay: defaults::SERIAL_OUT_DELAY,
            serial_out_jitter: defaults::SERIAL_OUT_JITTER,
            timer_quantum: defaults::TIMER_QUANTUM,
            timer_jitter: defaults::TIMER_JITTER,
            disk_seek_time: defaults::DISK_SEEK_TIME,
            disk_settle_time: defaults::DISK_SETTLE_TIME,
            disk_rotational_delay: defaults::DISK_ROTATIONAL_DELAY,
            disk_jitter: defaults::DISK_JITTER,
            disk_read_error_ppm: 0,
            disk_write_error_ppm: 0,
        }
    }
}

/// Physical memory size and the memory-mapped device register addresses.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MemoryConfig {
    /// Physical memory size in bytes
    #[serde(default = "MemoryConfig::default_memory_size")]
    pub memory_size: u32,

    /// First byte of the MMIO window
    #[serde(default = "MemoryConfig::default_mmio_low")]
    pub mmio_low: u32,

    /// Last byte of the MMIO window
    #[serde(default = "MemoryConfig::default_mmio_high")]
    pub mmio_high: u32,

    /// Serial status register
    #[serde(default = "MemoryConfig::default_serial_status")]
    pub serial_status_addr: u32,

    /// Serial data register
    #[serde(default = "MemoryConfig::default_serial_data")]
    pub serial_data_addr: u32,

    /// Disk status register
    #[serde(default = "MemoryConfig::default_disk_status")]
    pub disk_status_addr: u32,

    /// Disk command register
    #[serde(default = "MemoryConfig::default_disk_command")]
    pub disk_command_addr: u32,

    /// Disk transfer memory address register
    #[serde(default = "MemoryConfig::default_disk_memory")]
    pub disk_memory_addr: u32,

    /// Disk starting sector register
    #[serde(default = "MemoryConfig::default_disk_sector")]
    pub disk_sector_addr: u32,

    /// Disk sector count register
    #[serde(default = "MemoryConfig::default_disk_count")]
    pub disk_count_addr: u32,
}

impl MemoryConfig {
    fn default_memory_size() -> u32 {
        defaults::MEMORY_SIZE
    }

    fn default_mmio_low() -> u32 {
        defaults::MMIO_LOW
    }

    fn default_mmio_high() -> u32 {
        defaults::MMIO_HIGH
    }

    fn default_serial_status() -> u32 {
        defaults::SERIAL_STATUS_ADDR
    }

    fn default_serial_data() -> u32 {
        defaults::SERIAL_DATA_ADDR
    }

    fn default_disk_status() -> u32 {
        defaults::DISK_STATUS_ADDR
    }

    fn default_disk_command() -> u32 {
        defaults::DISK_COMMAND_ADDR
    }

    fn default_disk_memory() -> u32 {
        defaults::DISK_MEMORY_ADDR
    }

    fn default_disk_sector() -> u32 {
        defaults::DISK_SECTOR_ADDR
    }

    fn default_disk_count() -> u32 {
        defaults::DISK_COUNT_ADDR
    }

    /// Every device register as (name, address), in a fixed order.
    pub const fn registers(&self) -> [(&'static str, u32); 7] {
        [
            ("serial_status", self.serial_status_addr),
            ("serial_data", self.serial_data_addr),
            ("disk_status", self.disk_status_addr),
            ("disk_command", self.disk_command_addr),
            ("disk_memory", self.disk_memory_addr),
            ("disk_sector", self.disk_sector_addr),
            ("disk_count", self.disk_count_addr),
        ]
    }

    /// Whether a physical address falls in the MMIO window.
    #[inline]
    pub const fn in_mmio_window(&self, addr: u32) -> bool {
        addr >= self.mmio_low && addr <= self.mmio_high
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            memory_size: defaults::MEMORY_SIZE,
            mmio_low: defaults::MMIO_LOW,
            mmio_high: defaults::MMIO_HIGH,
            serial_status_addr: defaults::SERIAL_STATUS_ADDR,
            serial_data_addr: defaults::SERIAL_DATA_ADDR,
            disk_status_addr: defaults::DISK_STATUS_ADDR,
            disk_command_addr: defaults::DISK_COMMAND_ADDR,
            disk_memory_addr: defaults::DISK_MEMORY_ADDR,
            disk_sector_addr: defaults::DISK_SECTOR_ADDR,
            disk_count_addr: defaults::DISK_COUNT_ADDR,
        }
    }
}
