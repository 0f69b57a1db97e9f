//! One machine cycle.
//!
//! A cycle advances the simulated clock, fires due scheduler events into the
//! interrupt controller, and then either dispatches the highest-priority
//! deliverable interrupt or runs one instruction through fetch, decode and execute.

use tracing::trace;

use super::execute::Flow;
use super::{Cpu, HaltReason};
use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::{Fault, Interrupt, MachineError, Trap};
use crate::core::arch::mode::Mode;
use crate::core::units::mmu::Access;
use crate::isa::decode::decode;
use crate::isa::disasm::disassemble;

impl Cpu {
    /// Runs one cycle.
    ///
    /// Does nothing once the machine has halted.
    ///
    /// # Returns
    ///
    /// A host-fatal error from memory, a device or the lock discipline.
    pub fn tick(&mut self) -> Result<(), MachineError> {
        if self.halted.is_some() {
            return Ok(());
        }

        self.bus.scheduler.now += 1;
        self.stats.cycles += 1;
        match self.mode() {
            Mode::User => self.stats.cycles_user += 1,
            Mode::System => self.stats.cycles_system += 1,
        }

        let raised = self.bus.process_events()?;
        self.raise_mask(raised);

        if let Some(class) = self.interrupts.select_next(self.status.i) {
            self.dispatch(class)?;
        } else {
            self.step_instruction()?;
        }

        if self.bus.take_halt_request() {
            self.halt(HaltReason::DeviceMisuse);
        }
        Ok(())
    }

    /// Raises every class in a mask with an info word of 0.
    fn raise_mask(&mut self, mask: u32) {
        if mask == 0 {
            return;
        }
        for class in Interrupt::ALL {
            if mask & class.mask() != 0 {
                self.interrupts.raise(class, 0);
            }
        }
    }

    fn fetch(&mut self) -> Result<u32, Trap> {
        let physical = self.translate(self.pc, Access::READ)?;
        Ok(self.bus.read_word(physical)?)
    }

    /// Fetches, decodes and executes the instruction at PC.
    fn step_instruction(&mut self) -> Result<(), MachineError> {
        let pc = self.pc;
        let word = match self.fetch() {
            Ok(word) => word,
            Err(trap) => return self.record(trap),
        };

        let Some(decoded) = decode(word) else {
            self.interrupts.raise(Interrupt::IllegalInstruction, word);
            return Ok(());
        };
        if decoded.info.op.is_privileged() && self.mode() == Mode::User {
            self.interrupts.raise(Interrupt::PrivilegedInstruction, 0);
            return Ok(());
        }

        if self.trace {
            trace!(
                pc = format_args!("{pc:#010x}"),
                word = format_args!("{word:#010x}"),
                "{}",
                disassemble(word, pc)
            );
        }

        let flow = match self.execute(&decoded) {
            Ok(flow) => flow,
            Err(trap) => return self.record(trap),
        };
        self.stats.instructions += 1;

        let next = pc.wrapping_add(INSTRUCTION_SIZE);
        match flow {
            Flow::Next => self.pc = next,
            Flow::Jump(target) => self.pc = target,
            Flow::Trap(fault) => {
                self.pc = next;
                self.interrupts.raise_fault(fault);
            }
            Flow::Wait => {
                self.status.i = true;
                self.pc = next;
                self.idle();
            }
            Flow::Halt(reason) => {
                self.pc = next;
                self.halt(reason);
            }
        }
        Ok(())
    }

    /// Records a guest fault in the pending set or passes a host error up.
    fn record(&mut self, trap: Trap) -> Result<(), MachineError> {
        match trap {
            Trap::Guest(Fault { class, info }) => {
                self.interrupts.raise(class, info);
                Ok(())
            }
            Trap::Fatal(err) => Err(err),
        }
    }

    /// Idles after `wait` until something can happen.
    fn idle(&mut self) {
        if self.interrupts.select_next(self.status.i).is_some() {
            return;
        }
        match self.bus.scheduler.fast_forward() {
            Some(skipped) => {
                self.stats.cycles += skipped;
                self.stats.cycles_idle += skipped;
            }
            None if self.wait_for_input => match self.bus.await_input() {
                Some(mask) => self.raise_mask(mask),
                None => self.halt(HaltReason::InputExhausted),
            },
            None => self.halt(HaltReason::WaitIdle),
        }
    }
}
