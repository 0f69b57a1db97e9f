//! The opcode table.
//!
//! Each row pairs an opcode byte with its mnemonic, operand format and operation.
//! The decoder and the assembler both read this one table, so an instruction can
//! never be assembled into a word the emulator decodes differently.
//!
//! Numbering: format A from 0x00, B from 0x20, C at 0x29..0x2F and 0x54..0x58,
//! register-register D forms from 0x30, their immediate E twins at D + 0x20 for the
//! 0x60 block, F from 0xA0 and G from 0xC0.

use std::sync::OnceLock;

use crate::core::arch::status::Condition;
use crate::core::units::alu::AluOp;
use crate::core::units::fpu::FpuOp;

/// Operand layout of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// No operands.
    A,
    /// `rc`.
    B,
    /// `rc`, `ra`.
    C,
    /// `rc`, `ra`, `rb`.
    D,
    /// `rc`, `ra`, imm16.
    E,
    /// imm24.
    F,
    /// `rc`, imm16.
    G,
}

/// Operations executed by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Op {
    Nop,
    Wait,
    Debug,
    ClearI,
    SetI,
    ClearP,
    SetP,
    ClearS,
    Reti,
    Ret,
    Debug2,
    Ldptbr,
    Ldptlr,
    Push,
    Pop,
    Readu,
    Writeu,
    Tset,
    Fmov,
    Itof,
    Ftoi,
    Fcmp,
    Fsqrt,
    Fneg,
    Fabs,
    Fpu(FpuOp),
    Alu(AluOp),
    Load,
    Loadb,
    Loadv,
    Loadbv,
    Store,
    Storeb,
    Storev,
    Storebv,
    Fload,
    Fstore,
    Call,
    Jmp,
    Branch(Condition),
    Sethi,
    Setlo,
    Ldaddr,
    Syscall,
}

impl Op {
    /// Whether the operation is restricted to system mode.
    pub const fn is_privileged(self) -> bool {
        matches!(
            self,
            Self::Wait
                | Self::ClearI
                | Self::SetI
                | Self::ClearP
                | Self::SetP
                | Self::ClearS
                | Self::Reti
                | Self::Ldptbr
                | Self::Ldptlr
                | Self::Readu
                | Self::Writeu
                | Self::Loadv
                | Self::Loadbv
                | Self::Storev
                | Self::Storebv
        )
    }
}

/// One row of the opcode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Opcode byte.
    pub code: u8,
    /// Operation.
    pub op: Op,
    /// Operand format.
    pub format: Format,
    /// Assembler mnemonic.
    pub mnemonic: &'static str,
}

/// Branch mnemonics in `Condition::ALL` order.
pub const BRANCH_MNEMONICS: [&str; 16] = [
    "be", "bne", "bl", "ble", "bg", "bge", "bvs", "bvc", "bns", "bnc", "bss", "bsc", "bis", "bic",
    "bps", "bpc",
];

/// The three-operand block shared by formats D (0x60..) and E (0x80..).
const REG_IMM_BLOCK: [(&str, Op); 22] = [
    ("add", Op::Alu(AluOp::Add)),
    ("sub", Op::Alu(AluOp::Sub)),
    ("mul", Op::Alu(AluOp::Mul)),
    ("div", Op::Alu(AluOp::Div)),
    ("sll", Op::Alu(AluOp::Sll)),
    ("sra", Op::Alu(AluOp::Sra)),
    ("srl", Op::Alu(AluOp::Srl)),
    ("or", Op::Alu(AluOp::Or)),
    ("and", Op::Alu(AluOp::And)),
    ("andn", Op::Alu(AluOp::Andn)),
    ("xor", Op::Alu(AluOp::Xor)),
    ("load", Op::Load),
    ("loadb", Op::Loadb),
    ("loadv", Op::Loadv),
    ("loadbv", Op::Loadbv),
    ("store", Op::Store),
    ("storeb", Op::Storeb),
    ("storev", Op::Storev),
    ("storebv", Op::Storebv),
    ("rem", Op::Alu(AluOp::Rem)),
    ("fload", Op::Fload),
    ("fstore", Op::Fstore),
];

const D_BLOCK_BASE: u8 = 0x60;
const E_BLOCK_BASE: u8 = 0x80;
const D_CONTROL_BASE: u8 = 0x40;
const F_CONTROL_BASE: u8 = 0xA0;

fn build_table() -> Vec<OpcodeInfo> {
    let mut rows = Vec::with_capacity(128);
    let mut row = |code: u8, mnemonic: &'static str, format: Format, op: Op| {
        rows.push(OpcodeInfo {
            code,
            op,
            format,
            mnemonic,
        });
    };

    row(0x00, "nop", Format::A, Op::Nop);
    row(0x01, "wait", Format::A, Op::Wait);
    row(0x02, "debug", Format::A, Op::Debug);
    row(0x03, "cleari", Format::A, Op::ClearI);
    row(0x04, "seti", Format::A, Op::SetI);
    row(0x05, "clearp", Format::A, Op::ClearP);
    row(0x06, "setp", Format::A, Op::SetP);
    row(0x07, "clears", Format::A, Op::ClearS);
    row(0x08, "reti", Format::A, Op::Reti);
    row(0x09, "ret", Format::A, Op::Ret);
    row(0x0A, "debug2", Format::A, Op::Debug2);

    row(0x20, "ldptbr", Format::B, Op::Ldptbr);
    row(0x21, "ldptlr", Format::B, Op::Ldptlr);

    row(0x29, "fmov", Format::C, Op::Fmov);
    row(0x2A, "itof", Format::C, Op::Itof);
    row(0x2B, "ftoi", Format::C, Op::Ftoi);
    row(0x2C, "fcmp", Format::C, Op::Fcmp);
    row(0x2D, "fsqrt", Format::C, Op::Fsqrt);
    row(0x2E, "fneg", Format::C, Op::Fneg);
    row(0x2F, "fabs", Format::C, Op::Fabs);
    row(0x54, "push", Format::C, Op::Push);
    row(0x55, "pop", Format::C, Op::Pop);
    row(0x56, "readu", Format::C, Op::Readu);
    row(0x57, "writeu", Format::C, Op::Writeu);
    row(0x58, "tset", Format::C, Op::Tset);

    row(0x30, "fadd", Format::D, Op::Fpu(FpuOp::Add));
    row(0x31, "fsub", Format::D, Op::Fpu(FpuOp::Sub));
    row(0x32, "fmul", Format::D, Op::Fpu(FpuOp::Mul));
    row(0x33, "fdiv", Format::D, Op::Fpu(FpuOp::Div));

    row(D_CONTROL_BASE, "call", Format::D, Op::Call);
    row(D_CONTROL_BASE + 1, "jmp", Format::D, Op::Jmp);
    row(F_CONTROL_BASE, "call", Format::F, Op::Call);
    row(F_CONTROL_BASE + 1, "jmp", Format::F, Op::Jmp);
    for (i, (mnemonic, cond)) in BRANCH_MNEMONICS.into_iter().zip(Condition::ALL).enumerate() {
        let offset = 2 + i as u8;
        row(D_CONTROL_BASE + offset, mnemonic, Format::D, Op::Branch(cond));
        row(F_CONTROL_BASE + offset, mnemonic, Format::F, Op::Branch(cond));
    }

    for (i, (mnemonic, op)) in REG_IMM_BLOCK.into_iter().enumerate() {
        row(D_BLOCK_BASE + i as u8, mnemonic, Format::D, op);
        row(E_BLOCK_BASE + i as u8, mnemonic, Format::E, op);
    }

    row(0xC0, "sethi", Format::G, Op::Sethi);
    row(0xC1, "setlo", Format::G, Op::Setlo);
    row(0xC2, "ldaddr", Format::G, Op::Ldaddr);
    row(0xC3, "syscall", Format::G, Op::Syscall);

    rows
}

struct Table {
    rows: Vec<OpcodeInfo>,
    by_code: [Option<usize>; 256],
}

fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| {
        let rows = build_table();
        let mut by_code = [None; 256];
        for (i, info) in rows.iter().enumerate() {
            by_code[info.code as usize] = Some(i);
        }
        Table { rows, by_code }
    })
}

/// Every row of the table.
pub fn all() -> &'static [OpcodeInfo] {
    &table().rows
}

/// Looks up an opcode byte.
///
/// # Returns
///
/// The table row, or `None` for an unassigned byte (an illegal instruction).
#[inline]
pub fn lookup(code: u8) -> Option<&'static OpcodeInfo> {
    let t = table();
    t.by_code[code as usize].map(|i| &t.rows[i])
}

/// Finds the row for a mnemonic in a given format.
pub fn find(mnemonic: &str, format: Format) -> Option<&'static OpcodeInfo> {
    table()
        .rows
        .iter()
        .find(|info| info.format == format && info.mnemonic == mnemonic)
}

/// Whether any format of `mnemonic` exists.
pub fn is_mnemonic(mnemonic: &str) -> bool {
    table().rows.iter().any(|info| info.mnemonic == mnemonic)
}
