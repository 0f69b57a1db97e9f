//! Interrupt dispatch and return.
//!
//! This module moves the CPU into a handler and back. It handles:
//! 1. **Reset Classes:** POWER_ON_RESET and HARDWARE_FAULT drop everything else
//!    pending and jump to their vector without saving state.
//! 2. **Frame Push:** Every other class pushes PC, status and the info word on the
//!    system stack.
//! 3. **Nested Faults:** A fault during the push escalates to
//!    EXCEPTION_DURING_INTERRUPT; a fault during that dispatch halts the machine.
//! 4. **Return:** `reti` pops the frame back.

use tracing::debug;

use super::{Cpu, HaltReason};
use crate::common::constants::STACK_POINTER;
use crate::common::error::{Interrupt, MachineError, Trap};
use crate::core::arch::mode::Mode;
use crate::core::arch::status::Status;
use crate::core::units::mmu::Access;

/// Bytes pushed by a dispatch: PC, status, info.
pub const FRAME_SIZE: u32 = 12;

impl Cpu {
    /// Delivers one interrupt class.
    ///
    /// # Arguments
    ///
    /// * `class` - The class chosen by `select_next`.
    ///
    /// # Returns
    ///
    /// A host error only when the memory lock is misused underneath the push.
    pub fn dispatch(&mut self, class: Interrupt) -> Result<(), MachineError> {
        let info = self.interrupts.take(class);
        self.stats.record_interrupt(class);
        debug!(
            class = class.name(),
            info = format_args!("{info:#010x}"),
            pc = format_args!("{:#010x}", self.pc),
            "dispatch"
        );

        if matches!(class, Interrupt::PowerOnReset | Interrupt::HardwareFault) {
            self.interrupts.clear_all();
            self.status = self.handler_status();
            self.pc = class.vector();
            return Ok(());
        }

        let saved_pc = self.pc;
        let saved_status = self.status.to_word();
        self.status = self.handler_status();

        match self.push_frame(saved_pc, saved_status, info) {
            Ok(()) => {
                self.pc = class.vector();
                Ok(())
            }
            Err(Trap::Guest(fault)) => {
                debug!(%fault, "fault while pushing an interrupt frame");
                if class == Interrupt::ExceptionDuringInterrupt {
                    self.halt(HaltReason::DoubleFault);
                } else {
                    self.interrupts.clear_all();
                    self.interrupts.raise(Interrupt::ExceptionDuringInterrupt, 0);
                }
                Ok(())
            }
            Err(Trap::Fatal(err)) => Err(err),
        }
    }

    /// Handler status: interrupts off, system mode, paging off, flags kept.
    const fn handler_status(&self) -> Status {
        Status {
            i: false,
            s: true,
            p: false,
            ..self.status
        }
    }

    /// Writes the three-word frame below the system stack pointer.
    ///
    /// All three slots are translated before any is written, so a fault leaves
    /// memory and the stack pointer untouched.
    fn push_frame(&mut self, pc: u32, status: u32, info: u32) -> Result<(), Trap> {
        let sp = self.regs.read(Mode::System, STACK_POINTER);
        let slots = [
            (sp.wrapping_sub(4), pc),
            (sp.wrapping_sub(8), status),
            (sp.wrapping_sub(FRAME_SIZE), info),
        ];
        let mut physical = [0u32; 3];
        for (slot, (addr, _)) in physical.iter_mut().zip(slots) {
            *slot = self.translate(addr, Access::WRITE)?;
        }
        for (addr, (_, value)) in physical.into_iter().zip(slots) {
            self.bus.write_word(addr, value)?;
        }
        self.regs
            .write(Mode::System, STACK_POINTER, sp.wrapping_sub(FRAME_SIZE));
        Ok(())
    }

    /// Pops an interrupt frame (`reti`).
    ///
    /// The info word is discarded; status and PC are restored.
    pub(crate) fn return_from_interrupt(&mut self) -> Result<(), Trap> {
        let sp = self.regs.read(Mode::System, STACK_POINTER);
        // info at sp is skipped but must still be addressable
        self.load_word(sp, false)?;
        let status = self.load_word(sp.wrapping_add(4), false)?;
        let pc = self.load_word(sp.wrapping_add(8), false)?;
        self.regs
            .write(Mode::System, STACK_POINTER, sp.wrapping_add(FRAME_SIZE));
        self.status = Status::from_word(status);
        self.pc = pc;
        Ok(())
    }
}
