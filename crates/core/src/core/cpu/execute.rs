//! Instruction semantics.
//!
//! `execute` is one match over the decoded operation. It reads and writes
//! architectural state and reports how the PC moves next as a `Flow`. Guest faults
//! come back as `Err(Trap::Guest)` and leave the PC on the faulting instruction.

use super::{Cpu, HaltReason};
use crate::common::constants::{INSTRUCTION_SIZE, STACK_POINTER};
use crate::common::error::{Fault, Interrupt, MachineError, Trap};
use crate::core::arch::mode::Mode;
use crate::core::units::alu::Alu;
use crate::core::units::fpu::Fpu;
use crate::core::units::mmu::Access;
use crate::isa::decode::Decoded;
use crate::isa::opcodes::{Format, Op};

/// How control continues after an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Fall through to PC + 4.
    Next,
    /// Continue at an absolute address.
    Jump(u32),
    /// Advance past the instruction, then raise the fault (`syscall`).
    Trap(Fault),
    /// Advance, then idle until the next event (`wait`).
    Wait,
    /// Advance, then stop the run.
    Halt(HaltReason),
}

/// `debug2` function numbers, selected by r1.
const DEBUG2_PRINT_INT: u32 = 1;
const DEBUG2_PRINT_CHAR: u32 = 2;
const DEBUG2_PRINT_DOUBLE: u32 = 3;

impl Cpu {
    /// Executes one decoded instruction.
    ///
    /// # Arguments
    ///
    /// * `d` - The decoded instruction at `self.pc`.
    ///
    /// # Returns
    ///
    /// The control flow outcome, a guest fault, or a host-fatal error.
    pub fn execute(&mut self, d: &Decoded) -> Result<Flow, Trap> {
        let format = d.info.format;
        let ra = self.reg(d.ra);
        let op2 = match format {
            Format::E => d.imm16 as u32,
            _ => self.reg(d.rb),
        };
        let address = ra.wrapping_add(op2);

        match d.info.op {
            Op::Nop => {}
            Op::Wait => return Ok(Flow::Wait),
            Op::Debug => return Ok(Flow::Halt(HaltReason::Debug)),
            Op::ClearI => self.status.i = false,
            Op::SetI => self.status.i = true,
            Op::ClearP => self.status.p = false,
            Op::SetP => self.status.p = true,
            Op::ClearS => self.status.s = false,
            Op::Reti => {
                self.return_from_interrupt()?;
                return Ok(Flow::Jump(self.pc));
            }
            Op::Ret => {
                let sp = self.reg(STACK_POINTER);
                let target = self.load_word(sp, false)?;
                Self::check_target(target)?;
                self.set_reg(STACK_POINTER, sp.wrapping_add(4));
                return Ok(Flow::Jump(target));
            }
            Op::Debug2 => self.debug_service()?,

            Op::Ldptbr => self.ptbr = self.reg(d.rc),
            Op::Ldptlr => self.ptlr = self.reg(d.rc),

            Op::Push => {
                let addr = ra.wrapping_sub(4);
                self.store_word(addr, self.reg(d.rc), false)?;
                self.set_reg(d.ra, addr);
            }
            Op::Pop => {
                let value = self.load_word(ra, false)?;
                self.set_reg(d.ra, ra.wrapping_add(4));
                self.set_reg(d.rc, value);
            }
            Op::Readu => {
                let value = self.regs.read(Mode::User, d.ra);
                self.regs.write(Mode::System, d.rc, value);
            }
            Op::Writeu => {
                let value = self.regs.read(Mode::System, d.ra);
                self.regs.write(Mode::User, d.rc, value);
            }
            Op::Tset => {
                let physical = self.translate(ra, Access::WRITE)?;
                let old = self.bus.memory.read_word_locked(physical)?;
                self.bus.memory.write_word_and_unlock(physical, 1)?;
                self.set_reg(d.rc, old);
            }

            Op::Fmov => self.regs.write_f(d.rc, self.regs.read_f(d.ra)),
            Op::Itof => self.regs.write_f(d.rc, Fpu::from_int(ra as i32)),
            Op::Ftoi => {
                let value = Fpu::to_int(self.regs.read_f(d.ra))
                    .ok_or(Fault::new(Interrupt::ArithmeticException, 0))?;
                self.set_reg(d.rc, value as u32);
            }
            Op::Fcmp => {
                let flags = Fpu::compare(self.regs.read_f(d.ra), self.regs.read_f(d.rc));
                self.status.set_flags(flags);
            }
            Op::Fsqrt => self.regs.write_f(d.rc, Fpu::sqrt(self.regs.read_f(d.ra))),
            Op::Fneg => self.regs.write_f(d.rc, Fpu::neg(self.regs.read_f(d.ra))),
            Op::Fabs => self.regs.write_f(d.rc, Fpu::abs(self.regs.read_f(d.ra))),
            Op::Fpu(op) => {
                let value = Fpu::execute(op, self.regs.read_f(d.ra), self.regs.read_f(d.rb));
                self.regs.write_f(d.rc, value);
            }

            Op::Alu(op) => {
                let result = Alu::execute(op, ra as i32, op2 as i32)
                    .ok_or(Fault::new(Interrupt::ArithmeticException, 0))?;
                self.status.set_flags(result.flags);
                self.set_reg(d.rc, result.value as u32);
            }

            Op::Load | Op::Loadv => {
                let value = self.load_word(address, d.info.op == Op::Loadv)?;
                self.set_reg(d.rc, value);
            }
            Op::Loadb | Op::Loadbv => {
                let value = self.load_byte(address, d.info.op == Op::Loadbv)?;
                self.set_reg(d.rc, value);
            }
            Op::Store | Op::Storev => {
                self.store_word(address, self.reg(d.rc), d.info.op == Op::Storev)?;
            }
            Op::Storeb | Op::Storebv => {
                self.store_byte(address, self.reg(d.rc), d.info.op == Op::Storebv)?;
            }
            Op::Fload => {
                let high = self.load_word(address, false)?;
                let low = self.load_word(address.wrapping_add(4), false)?;
                let bits = (u64::from(high) << 32) | u64::from(low);
                self.regs.write_f(d.rc, f64::from_bits(bits));
            }
            Op::Fstore => {
                let bits = self.regs.read_f(d.rc).to_bits();
                // both words must translate before either is written
                let hi = self.translate(address, Access::WRITE)?;
                let lo = self.translate(address.wrapping_add(4), Access::WRITE)?;
                self.bus.write_word(hi, (bits >> 32) as u32)?;
                self.bus.write_word(lo, bits as u32)?;
            }

            Op::Call => {
                let target = self.branch_target(d, address);
                Self::check_target(target)?;
                let sp = self.reg(STACK_POINTER).wrapping_sub(4);
                self.store_word(sp, self.pc.wrapping_add(INSTRUCTION_SIZE), false)?;
                self.set_reg(STACK_POINTER, sp);
                return Ok(Flow::Jump(target));
            }
            Op::Jmp => {
                let target = self.branch_target(d, address);
                Self::check_target(target)?;
                return Ok(Flow::Jump(target));
            }
            Op::Branch(cond) => {
                if cond.holds(&self.status) {
                    let target = self.branch_target(d, address);
                    Self::check_target(target)?;
                    return Ok(Flow::Jump(target));
                }
            }

            Op::Sethi => {
                let value = ((d.imm16 as u32 & 0xFFFF) << 16) | (self.reg(d.rc) & 0xFFFF);
                self.set_reg(d.rc, value);
            }
            Op::Setlo => {
                let value = (self.reg(d.rc) & 0xFFFF_0000) | (d.imm16 as u32 & 0xFFFF);
                self.set_reg(d.rc, value);
            }
            Op::Ldaddr => self.set_reg(d.rc, self.pc.wrapping_add(d.imm16 as u32)),
            Op::Syscall => {
                let number = self.reg(d.rc).wrapping_add(d.imm16 as u32);
                return Ok(Flow::Trap(Fault::new(Interrupt::SyscallTrap, number)));
            }
        }
        Ok(Flow::Next)
    }

    /// Target of a control transfer: `ra + rb` for format D, `PC + imm24` for F.
    fn branch_target(&self, d: &Decoded, register_target: u32) -> u32 {
        match d.info.format {
            Format::F => self.pc.wrapping_add(d.imm24 as u32),
            _ => register_target,
        }
    }

    fn check_target(target: u32) -> Result<(), Fault> {
        if target % INSTRUCTION_SIZE != 0 {
            return Err(Fault::new(Interrupt::AlignmentException, target));
        }
        Ok(())
    }

    /// The `debug2` host service.
    fn debug_service(&mut self) -> Result<(), MachineError> {
        let text = match self.reg(1) {
            DEBUG2_PRINT_INT => (self.reg(2) as i32).to_string(),
            DEBUG2_PRINT_CHAR => char::from(self.reg(2) as u8).to_string(),
            DEBUG2_PRINT_DOUBLE => self.regs.read_f(0).to_string(),
            other => {
                tracing::warn!(function = other, "unknown debug2 function");
                return Ok(());
            }
        };
        self.bus.serial.write_host(text.as_bytes())?;
        Ok(())
    }
}
