//! Instruction Disassembler.
//!
//! Converts an instruction word into the assembler's own syntax for `trace!`
//! output and the interactive monitor. Operand order follows the assembler:
//! sources first, destination last.
//!
//! # Usage
//!
//! ```
//! use blitz_core::isa::disasm::disassemble;
//! assert_eq!(disassemble(0x6032_1000, 0), "add r2, r1, r3");
//! ```

use super::decode::decode;
use super::opcodes::{Format, Op};

/// Renders one instruction.
///
/// # Arguments
///
/// * `word` - The instruction word.
/// * `pc` - Its address, used to resolve PC-relative targets.
pub fn disassemble(word: u32, pc: u32) -> String {
    let Some(d) = decode(word) else {
        return format!(".word {word:#010x}");
    };
    let m = d.info.mnemonic;
    let (rc, ra, rb, imm) = (d.rc, d.ra, d.rb, d.imm16);
    match (d.info.format, d.info.op) {
        (Format::A, _) => m.to_string(),
        (Format::B, _) => format!("{m} r{rc}"),
        (Format::C, Op::Push) => format!("{m} r{rc}, [--r{ra}]"),
        (Format::C, Op::Pop) => format!("{m} [r{ra}++], r{rc}"),
        (Format::C, Op::Tset) => format!("{m} [r{ra}], r{rc}"),
        (Format::C, Op::Itof) => format!("{m} r{ra}, f{rc}"),
        (Format::C, Op::Ftoi) => format!("{m} f{ra}, r{rc}"),
        (Format::C, Op::Readu | Op::Writeu) => format!("{m} r{ra}, r{rc}"),
        (Format::C, _) => format!("{m} f{ra}, f{rc}"),
        (Format::D, Op::Fpu(_)) => format!("{m} f{ra}, f{rb}, f{rc}"),
        (Format::D, Op::Call | Op::Jmp | Op::Branch(_)) => format!("{m} r{ra}+r{rb}"),
        (Format::D, Op::Load | Op::Loadb | Op::Loadv | Op::Loadbv) => {
            format!("{m} [r{ra}+r{rb}], r{rc}")
        }
        (Format::D, Op::Store | Op::Storeb | Op::Storev | Op::Storebv) => {
            format!("{m} r{rc}, [r{ra}+r{rb}]")
        }
        (Format::D, Op::Fload) => format!("{m} [r{ra}+r{rb}], f{rc}"),
        (Format::D, Op::Fstore) => format!("{m} f{rc}, [r{ra}+r{rb}]"),
        (Format::D, _) => format!("{m} r{ra}, r{rb}, r{rc}"),
        (Format::E, Op::Load | Op::Loadb | Op::Loadv | Op::Loadbv) => {
            format!("{m} [r{ra}+{imm}], r{rc}")
        }
        (Format::E, Op::Store | Op::Storeb | Op::Storev | Op::Storebv) => {
            format!("{m} r{rc}, [r{ra}+{imm}]")
        }
        (Format::E, Op::Fload) => format!("{m} [r{ra}+{imm}], f{rc}"),
        (Format::E, Op::Fstore) => format!("{m} f{rc}, [r{ra}+{imm}]"),
        (Format::E, _) => format!("{m} r{ra}, {imm}, r{rc}"),
        (Format::F, _) => {
            let target = pc.wrapping_add(d.imm24 as u32);
            format!("{m} {target:#010x}")
        }
        (Format::G, Op::Sethi) => format!("{m} {:#06x}, r{rc}", word & 0xFFFF),
        (Format::G, Op::Setlo) => format!("{m} {:#06x}, r{rc}", word & 0xFFFF),
        (Format::G, Op::Ldaddr) => {
            let target = pc.wrapping_add(imm as u32);
            format!("{m} {target:#010x}, r{rc}")
        }
        (Format::G, _) => format!("{m} r{rc}+{imm}"),
    }
}
