//! Disk Controller.
//!
//! Implements the sector-addressed disk. It provides:
//! 1. **Registers:** Memory address, starting sector and sector count, plus the
//!    shared status/command word.
//! 2. **Commands:** READ and WRITE of whole sectors by DMA into physical memory.
//! 3. **Timing:** Each command is BUSY until its completion event, which is
//!    `seek + settle + rotational * count + jitter` cycles away; the outcome is
//!    staged at command time and becomes visible at completion.
//! 4. **Fault Injection:** Simulated hard errors drawn from per-million rates.

use tracing::{debug, warn};

use crate::common::constants::{PAGE_SIZE, SECTOR_SIZE, SECTORS_PER_TRACK};
use crate::common::error::MachineError;
use crate::config::TimingConfig;
use crate::object::DiskImage;
use crate::soc::memory::PhysicalMemory;
use crate::soc::scheduler::Scheduler;

/// Disk status register values.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiskStatus {
    /// A command is in progress.
    Busy = 0,
    /// The last command succeeded.
    Ok = 1,
    /// No disk image is attached.
    NotReady = 2,
    /// The command word was not READ or WRITE.
    BadCommand = 3,
    /// The memory range is unaligned or outside memory.
    BadAddress = 4,
    /// The sector range is outside the image.
    BadSector = 5,
    /// Simulated media failure.
    Hard = 6,
}

/// Disk command register values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiskCommand {
    /// Disk to memory.
    Read = 1,
    /// Memory to disk.
    Write = 2,
}

impl DiskCommand {
    /// Decodes a command word.
    pub const fn from_word(word: u32) -> Option<Self> {
        match word {
            1 => Some(Self::Read),
            2 => Some(Self::Write),
            _ => None,
        }
    }
}

/// A command in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Transfer {
    command: DiskCommand,
    memory_addr: u32,
    sector: u32,
    count: u32,
}

impl Transfer {
    fn byte_len(&self) -> usize {
        self.count as usize * SECTOR_SIZE as usize
    }
}

/// The disk controller.
#[derive(Debug)]
pub struct DiskDevice {
    image: Option<DiskImage>,
    status: DiskStatus,
    staged: DiskStatus,
    /// Memory address register.
    pub memory_addr: u32,
    /// Starting sector register.
    pub sector: u32,
    /// Sector count register.
    pub count: u32,
    current_track: u32,
    transfer: Option<Transfer>,
}

impl DiskDevice {
    /// Creates an idle controller, optionally with an attached image.
    pub fn new(image: Option<DiskImage>) -> Self {
        Self {
            image,
            status: DiskStatus::Ok,
            staged: DiskStatus::Ok,
            memory_addr: 0,
            sector: 0,
            count: 0,
            current_track: 0,
            transfer: None,
        }
    }

    /// Returns the controller to idle; the image stays attached.
    pub fn reset(&mut self) {
        self.status = DiskStatus::Ok;
        self.staged = DiskStatus::Ok;
        self.memory_addr = 0;
        self.sector = 0;
        self.count = 0;
        self.current_track = 0;
        self.transfer = None;
    }

    /// The status register.
    pub fn status(&self) -> DiskStatus {
        self.status
    }

    /// Whether a command is in progress.
    pub fn is_busy(&self) -> bool {
        self.status == DiskStatus::Busy
    }

    /// The physical byte range of the in-flight transfer, as `start..end`.
    pub fn guard_range(&self) -> Option<(u32, u64)> {
        if !self.is_busy() {
            return None;
        }
        self.transfer
            .map(|t| (t.memory_addr, u64::from(t.memory_addr) + t.byte_len() as u64))
    }

    fn validate(
        &mut self,
        word: u32,
        memory_size: u32,
        timing: &TimingConfig,
        scheduler: &mut Scheduler,
    ) -> Result<Transfer, DiskStatus> {
        let Some(image) = &self.image else {
            return Err(DiskStatus::NotReady);
        };
        let command = DiskCommand::from_word(word).ok_or(DiskStatus::BadCommand)?;
        let len = u64::from(self.count) * u64::from(SECTOR_SIZE);
        if self.count == 0
            || self.memory_addr % PAGE_SIZE != 0
            || u64::from(self.memory_addr) + len > u64::from(memory_size)
        {
            return Err(DiskStatus::BadAddress);
        }
        if u64::from(self.sector) + u64::from(self.count) > u64::from(image.sector_count()) {
            return Err(DiskStatus::BadSector);
        }
        let ppm = match command {
            DiskCommand::Read => timing.disk_read_error_ppm,
            DiskCommand::Write => timing.disk_write_error_ppm,
        };
        if ppm > 0 && scheduler.rng.between(0, 999_999) < u64::from(ppm) {
            return Err(DiskStatus::Hard);
        }
        Ok(Transfer {
            command,
            memory_addr: self.memory_addr,
            sector: self.sector,
            count: self.count,
        })
    }

    /// Starts a command written to the command register.
    ///
    /// The status becomes BUSY and the completion event is scheduled; the eventual
    /// status is decided now and applied by `complete`.
    ///
    /// # Arguments
    ///
    /// * `word` - The command word.
    /// * `memory_size` - Physical memory size, bounding the DMA range.
    /// * `timing` - Disk timing parameters and error rates.
    /// * `scheduler` - Clock and jitter source; its disk slot is set.
    pub fn start(
        &mut self,
        word: u32,
        memory_size: u32,
        timing: &TimingConfig,
        scheduler: &mut Scheduler,
    ) {
        let outcome = self.validate(word, memory_size, timing, scheduler);
        let base = match &outcome {
            Ok(t) => {
                let track = t.sector / SECTORS_PER_TRACK;
                let seek = if track != self.current_track {
                    timing.disk_seek_time
                } else {
                    0
                };
                self.current_track = (t.sector + t.count - 1) / SECTORS_PER_TRACK;
                seek.saturating_add(timing.disk_settle_time).saturating_add(
                    timing
                        .disk_rotational_delay
                        .saturating_mul(u64::from(t.count)),
                )
            }
            Err(_) => timing.disk_settle_time,
        };
        let when = scheduler.after(base, timing.disk_jitter);
        match outcome {
            Ok(t) => {
                debug!(command = ?t.command, sector = t.sector, count = t.count, when, "disk command");
                self.transfer = Some(t);
                self.staged = DiskStatus::Ok;
            }
            Err(status) => {
                warn!(?status, word, "disk command rejected");
                self.transfer = None;
                self.staged = status;
            }
        }
        self.status = DiskStatus::Busy;
        scheduler.disk = when;
    }

    /// Completes the in-flight command: performs the DMA and publishes the status.
    pub fn complete(&mut self, memory: &mut PhysicalMemory) -> Result<(), MachineError> {
        if let Some(t) = self.transfer.take() {
            if let Some(image) = self.image.as_mut() {
                let len = t.byte_len();
                let result = match t.command {
                    DiskCommand::Read => {
                        image.read_sectors(t.sector, memory.slice_mut(t.memory_addr, len)?)
                    }
                    DiskCommand::Write => {
                        image.write_sectors(t.sector, memory.slice(t.memory_addr, len)?)
                    }
                };
                result?;
            }
        }
        self.status = self.staged;
        debug!(status = ?self.status, "disk command complete");
        Ok(())
    }
}
