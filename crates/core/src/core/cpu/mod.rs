//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, the container for the entire
//! processor state. It coordinates the following:
//! 1. **State Management:** Banked registers, program counter, status word and the
//!    page table registers.
//! 2. **Interrupts:** The pending set, consulted before every fetch.
//! 3. **System Integration:** Owns the `System` holding memory, devices and the clock.
//! 4. **Lifecycle:** Power-on reset and the halt conditions that end a run.

/// One machine cycle: event processing, dispatch or fetch-decode-execute.
pub mod execution;

/// Instruction semantics.
pub mod execute;

/// Translated memory access on behalf of instructions.
pub mod memory;

/// Interrupt dispatch and return.
pub mod trap;

use std::fmt;

use crate::common::RegisterFile;
use crate::common::error::Interrupt;
use crate::config::Config;
use crate::core::arch::interrupts::InterruptController;
use crate::core::arch::mode::Mode;
use crate::core::arch::status::Status;
use crate::core::units::mmu::TranslationContext;
use crate::soc::System;
use crate::stats::SimStats;

/// Why the machine stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaltReason {
    /// A `debug` instruction returned control to the host.
    Debug,
    /// `wait` found nothing scheduled and nothing pending.
    WaitIdle,
    /// `wait` blocked on host input that has ended.
    InputExhausted,
    /// A CPU access touched an in-flight disk buffer, or a disk register was written
    /// while busy.
    DeviceMisuse,
    /// A fault occurred while dispatching EXCEPTION_DURING_INTERRUPT.
    DoubleFault,
    /// The host asked the run to stop (Ctrl-C).
    HostInterrupt,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Debug => "debug instruction",
            Self::WaitIdle => "wait with nothing scheduled",
            Self::InputExhausted => "wait on exhausted input",
            Self::DeviceMisuse => "device misuse",
            Self::DoubleFault => "fault during EXCEPTION_DURING_INTERRUPT dispatch",
            Self::HostInterrupt => "host interrupt",
        };
        f.write_str(text)
    }
}

/// Main CPU structure containing all processor state.
#[derive(Debug)]
pub struct Cpu {
    /// Integer and floating registers.
    pub regs: RegisterFile,
    /// Program Counter.
    pub pc: u32,
    /// Status register.
    pub status: Status,
    /// Page table base register.
    pub ptbr: u32,
    /// Page table length register.
    pub ptlr: u32,
    /// Pending interrupts.
    pub interrupts: InterruptController,

    /// Memory, devices and clock.
    pub bus: System,
    /// Run statistics.
    pub stats: SimStats,
    /// Emit a `trace!` line per instruction.
    pub trace: bool,
    /// Block on host input when `wait` would otherwise halt.
    pub wait_for_input: bool,
    /// Set once the machine stops; cleared by `reset` or `resume`.
    pub halted: Option<HaltReason>,
}

impl Cpu {
    /// Creates a new CPU on the given system.
    ///
    /// # Arguments
    ///
    /// * `system` - Memory, devices and scheduler.
    /// * `config` - Emulator configuration (trace and wait policy).
    ///
    /// # Returns
    ///
    /// A CPU in the reset state with POWER_ON_RESET pending.
    pub fn new(system: System, config: &Config) -> Self {
        let mut cpu = Self {
            regs: RegisterFile::new(),
            pc: 0,
            status: Status::reset(),
            ptbr: 0,
            ptlr: 0,
            interrupts: InterruptController::new(),
            bus: system,
            stats: SimStats::default(),
            trace: config.general.trace_instructions,
            wait_for_input: config.general.wait_for_input,
            halted: None,
        };
        cpu.reset();
        cpu
    }

    /// Power-on reset.
    ///
    /// Zeroes the registers, sets status to system mode with interrupts and paging
    /// off, resets devices and the clock, and leaves POWER_ON_RESET pending so the
    /// first cycle vectors to address 0. Memory is kept.
    pub fn reset(&mut self) {
        self.regs.clear();
        self.pc = 0;
        self.status = Status::reset();
        self.ptbr = 0;
        self.ptlr = 0;
        self.interrupts.clear_all();
        self.interrupts.raise(Interrupt::PowerOnReset, 0);
        self.bus.reset();
        self.halted = None;
    }

    /// Clears a halt so the run can continue.
    pub fn resume(&mut self) {
        self.halted = None;
    }

    /// Stops the machine.
    pub fn halt(&mut self, reason: HaltReason) {
        if self.halted.is_none() {
            tracing::info!(%reason, pc = format_args!("{:#010x}", self.pc), "machine halted");
            self.halted = Some(reason);
        }
    }

    /// The current privilege mode.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.status.mode()
    }

    /// Reads an integer register from the active bank.
    #[inline]
    pub fn reg(&self, idx: usize) -> u32 {
        self.regs.read(self.mode(), idx)
    }

    /// Writes an integer register in the active bank.
    #[inline]
    pub fn set_reg(&mut self, idx: usize, val: u32) {
        self.regs.write(self.mode(), idx, val);
    }

    /// Paging state for the translation unit.
    #[inline]
    pub fn translation_context(&self) -> TranslationContext {
        TranslationContext {
            paging: self.status.p,
            ptbr: self.ptbr,
            ptlr: self.ptlr,
        }
    }

    /// Dumps the current CPU state to stdout.
    pub fn dump_state(&self) {
        println!(
            "PC = {:#010x}  status = {:#04x}  mode = {}  PTBR = {:#010x}  PTLR = {:#010x}",
            self.pc,
            self.status.to_word(),
            self.mode(),
            self.ptbr,
            self.ptlr
        );
        println!(
            "pending = {:#06x}  cycle = {}",
            self.interrupts.pending(),
            self.bus.scheduler.now
        );
        self.regs.dump(self.mode());
    }
}
