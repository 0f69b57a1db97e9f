//! System construction and the top-level `System` type.
//!
//! This module assembles the machine outside the CPU. It performs:
//! 1. **Memory setup:** Allocates physical memory of the configured size.
//! 2. **Device setup:** Creates the serial device on the given console and the disk
//!    controller on the optional image.
//! 3. **Event processing:** Fires due scheduler events and reports the interrupt
//!    classes they raise.
//! 4. **Disk guard:** Flags CPU accesses that touch an in-flight DMA buffer.

use tracing::{debug, error};

use crate::common::constants::NEVER;
use crate::common::error::{Interrupt, MachineError};
use crate::config::{Config, MemoryConfig, TimingConfig};
use crate::object::DiskImage;
use crate::soc::devices::{DiskDevice, SerialDevice};
use crate::soc::memory::PhysicalMemory;
use crate::soc::scheduler::Scheduler;
use crate::soc::traits::Console;

/// Physical memory, devices and the event scheduler.
#[derive(Debug)]
pub struct System {
    /// Physical memory.
    pub memory: PhysicalMemory,
    /// MMIO window and register addresses.
    pub map: MemoryConfig,
    /// Device timing.
    pub timing: TimingConfig,
    /// Generator seed, reapplied on reset.
    pub seed: u32,
    /// Serial device.
    pub serial: SerialDevice,
    /// Disk controller.
    pub disk: DiskDevice,
    /// Clock and event slots.
    pub scheduler: Scheduler,
    halt_requested: bool,
}

impl System {
    /// Builds a new system from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Machine configuration (memory map, timing, seed).
    /// * `console` - Host side of the serial line.
    /// * `disk` - Disk image to attach; commands report NOT_READY without one.
    ///
    /// # Returns
    ///
    /// A `System` with zeroed memory and idle devices; call `reset` before running.
    pub fn new(config: &Config, console: Box<dyn Console>, disk: Option<DiskImage>) -> Self {
        Self {
            memory: PhysicalMemory::new(config.memory.memory_size),
            map: config.memory,
            timing: config.timing.clone(),
            seed: config.general.random_seed,
            serial: SerialDevice::new(console),
            disk: DiskDevice::new(disk),
            scheduler: Scheduler::new(config.general.random_seed),
            halt_requested: false,
        }
    }

    /// Resets devices and the clock and schedules the first timer and keyboard events.
    ///
    /// Memory contents are kept so a loaded program survives a reset.
    pub fn reset(&mut self) {
        self.scheduler.reset(self.seed);
        self.serial.reset();
        self.disk.reset();
        self.memory.clear_lock();
        self.halt_requested = false;
        self.scheduler.timer = self.next_timer();
        if !self.serial.host_exhausted() {
            self.scheduler.serial_in = self
                .scheduler
                .after(self.timing.keyboard_wait, self.timing.keyboard_jitter);
        }
    }

    fn next_timer(&mut self) -> u64 {
        if self.timing.timer_quantum == 0 {
            return NEVER;
        }
        self.scheduler
            .after(self.timing.timer_quantum, self.timing.timer_jitter)
    }

    /// Fires every event due at the current cycle.
    ///
    /// # Returns
    ///
    /// The pending-set mask of interrupt classes raised by the events.
    pub fn process_events(&mut self) -> Result<u32, MachineError> {
        if !self.scheduler.is_due() {
            return Ok(0);
        }
        let now = self.scheduler.now;
        let mut raised = 0;

        if self.scheduler.timer <= now {
            raised |= Interrupt::Timer.mask();
            self.scheduler.timer = self.next_timer();
            debug!(now, "timer event");
        }

        if self.scheduler.disk <= now {
            self.scheduler.disk = NEVER;
            self.disk.complete(&mut self.memory)?;
            raised |= Interrupt::Disk.mask();
        }

        if self.scheduler.serial_out <= now {
            self.scheduler.serial_out = NEVER;
            self.serial.complete_output()?;
            raised |= Interrupt::Serial.mask();
        }

        if self.scheduler.serial_in <= now {
            if let Some(byte) = self.serial.poll_host() {
                self.serial.receive(byte);
                raised |= Interrupt::Serial.mask();
                debug!(now, byte, "serial input");
            }
            self.scheduler.serial_in = if self.serial.host_exhausted() {
                NEVER
            } else {
                self.scheduler
                    .after(self.timing.keyboard_wait, self.timing.keyboard_jitter)
            };
        }

        Ok(raised)
    }

    /// Blocks on host input and latches the character.
    ///
    /// # Returns
    ///
    /// The SERIAL mask when a character arrived, `None` when input is exhausted.
    pub fn await_input(&mut self) -> Option<u32> {
        let byte = self.serial.wait_host()?;
        self.serial.receive(byte);
        Some(Interrupt::Serial.mask())
    }

    /// Checks a CPU word access against the in-flight disk transfer.
    ///
    /// The access itself is not prevented; a violation is logged and requests a halt.
    pub fn check_disk_guard(&mut self, physical: u32) {
        if let Some((start, end)) = self.disk.guard_range() {
            if u64::from(physical) + 4 > u64::from(start) && u64::from(physical) < end {
                error!(
                    addr = format_args!("{physical:#010x}"),
                    buffer = format_args!("{start:#010x}..{end:#010x}"),
                    "CPU access to a disk buffer during a transfer"
                );
                self.halt_requested = true;
            }
        }
    }

    /// Requests that the machine halt after the current cycle.
    pub fn request_halt(&mut self) {
        self.halt_requested = true;
    }

    /// Returns and clears the pending halt request.
    pub fn take_halt_request(&mut self) -> bool {
        std::mem::take(&mut self.halt_requested)
    }
}
