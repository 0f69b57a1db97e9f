//! # Instruction Execution Tests
//!
//! Each test places a few encoded instructions at 0x1000 with nothing pending and
//! ticks the machine one cycle per instruction.

use blitz_core::common::Interrupt;
use blitz_core::core::cpu::HaltReason;
use blitz_core::core::units::mmu::pte::{PTE_DIRTY, PTE_REFERENCED, PTE_VALID, PTE_WRITABLE};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::{TestContext, op_a, op_b, op_c, op_d, op_e, op_f, op_g};

const BASE: u32 = 0x1000;

fn program(words: &[u32]) -> TestContext {
    TestContext::new().load_program(BASE, words)
}

#[test]
fn test_add_immediate() {
    let mut ctx = program(&[op_e("add", 1, 5, 2)]);
    ctx.set_reg(1, 10);
    ctx.run(1);
    assert_eq!(ctx.get_reg(2), 15);
    assert_eq!(ctx.cpu().pc, BASE + 4);
    assert_eq!(ctx.cpu().stats.instructions, 1);
}

#[test]
fn test_add_overflow_sets_flags() {
    let mut ctx = program(&[op_d("add", 1, 2, 3)]);
    ctx.set_reg(1, i32::MAX as u32);
    ctx.set_reg(2, 1);
    ctx.run(1);
    assert_eq!(ctx.get_reg(3), 0x8000_0000);
    let st = ctx.cpu().status;
    assert!(st.v && st.n && !st.z);
}

#[test]
fn test_divide_by_zero_raises_and_keeps_pc() {
    let mut ctx = program(&[op_d("div", 1, 2, 3)]);
    ctx.set_reg(1, 7);
    ctx.set_reg(3, 0xAAAA);
    ctx.run(1);
    assert!(ctx.cpu().interrupts.is_pending(Interrupt::ArithmeticException));
    assert_eq!(ctx.cpu().pc, BASE);
    assert_eq!(ctx.get_reg(3), 0xAAAA);
    assert_eq!(ctx.cpu().stats.instructions, 0);
}

#[test]
fn test_r0_is_an_ordinary_register() {
    let mut ctx = program(&[op_e("add", 0, 7, 0)]);
    ctx.run(1);
    assert_eq!(ctx.get_reg(0), 7);
}

#[test]
fn test_store_then_load_word() {
    let mut ctx = program(&[op_e("store", 2, 8, 1), op_e("load", 2, 8, 3)]);
    ctx.set_reg(1, 0xDEAD_BEEF);
    ctx.set_reg(2, 0x2000);
    ctx.run(2);
    assert_eq!(ctx.read_word(0x2008), 0xDEAD_BEEF);
    assert_eq!(ctx.get_reg(3), 0xDEAD_BEEF);
}

#[test]
fn test_byte_access_is_big_endian_within_the_word() {
    let mut ctx = program(&[op_e("storeb", 2, 1, 1), op_e("loadb", 2, 1, 3)]);
    ctx.set_reg(1, 0x1234_56AB);
    ctx.set_reg(2, 0x2000);
    ctx.run(2);
    assert_eq!(ctx.read_word(0x2000), 0x00AB_0000);
    assert_eq!(ctx.get_reg(3), 0xAB);
}

#[test]
fn test_unaligned_word_load_faults_with_address() {
    let mut ctx = program(&[op_e("load", 2, 2, 3)]);
    ctx.set_reg(2, 0x2000);
    ctx.run(1);
    let info = ctx.cpu_mut().interrupts.take(Interrupt::AlignmentException);
    assert_eq!(info, 0x2002);
    assert_eq!(ctx.cpu().pc, BASE);
}

#[test]
fn test_push_and_pop() {
    let mut ctx = program(&[op_c("push", 15, 1), op_c("pop", 15, 2)]);
    ctx.set_reg(1, 0x55);
    ctx.set_reg(15, 0x3000);
    ctx.run(1);
    assert_eq!(ctx.read_word(0x2FFC), 0x55);
    assert_eq!(ctx.get_reg(15), 0x2FFC);
    ctx.run(1);
    assert_eq!(ctx.get_reg(2), 0x55);
    assert_eq!(ctx.get_reg(15), 0x3000);
}

#[test]
fn test_call_pushes_return_address_and_ret_pops_it() {
    let mut ctx = program(&[op_f("call", 8), op_a("nop"), op_a("ret")]);
    ctx.set_reg(15, 0x3000);
    ctx.run(1);
    assert_eq!(ctx.cpu().pc, BASE + 8);
    assert_eq!(ctx.read_word(0x2FFC), BASE + 4);
    ctx.run(1);
    assert_eq!(ctx.cpu().pc, BASE + 4);
    assert_eq!(ctx.get_reg(15), 0x3000);
}

#[rstest]
#[case(5, BASE + 12)]
#[case(6, BASE + 8)]
fn test_branch_on_equal(#[case] value: i32, #[case] next_pc: u32) {
    let mut ctx = program(&[op_e("sub", 1, value, 2), op_f("be", 8)]);
    ctx.set_reg(1, 5);
    ctx.run(2);
    assert_eq!(ctx.cpu().pc, next_pc);
}

#[test]
fn test_register_jump_to_unaligned_target() {
    let mut ctx = program(&[op_d("jmp", 1, 2, 0)]);
    ctx.set_reg(1, 0x2000);
    ctx.set_reg(2, 2);
    ctx.run(1);
    let info = ctx.cpu_mut().interrupts.take(Interrupt::AlignmentException);
    assert_eq!(info, 0x2002);
    assert_eq!(ctx.cpu().pc, BASE);
}

#[test]
fn test_sethi_setlo_build_a_constant() {
    let mut ctx = program(&[op_g("sethi", 0x1234, 4), op_g("setlo", 0x5678, 4)]);
    ctx.set_reg(4, 0xFFFF_FFFF);
    ctx.run(2);
    assert_eq!(ctx.get_reg(4), 0x1234_5678);
}

#[test]
fn test_ldaddr_is_pc_relative() {
    let mut ctx = program(&[op_g("ldaddr", -16, 3)]);
    ctx.run(1);
    assert_eq!(ctx.get_reg(3), BASE - 16);
}

#[test]
fn test_syscall_advances_then_raises_with_trap_number() {
    let mut ctx = program(&[op_g("syscall", 3, 1)]);
    ctx.set_reg(1, 4);
    ctx.run(1);
    assert_eq!(ctx.cpu().pc, BASE + 4);
    assert_eq!(ctx.cpu_mut().interrupts.take(Interrupt::SyscallTrap), 7);
}

#[test]
fn test_privileged_instruction_in_user_mode() {
    let mut ctx = program(&[op_a("seti")]);
    ctx.cpu_mut().status.s = false;
    ctx.run(1);
    assert!(ctx.cpu().interrupts.is_pending(Interrupt::PrivilegedInstruction));
    assert!(!ctx.cpu().status.i);
    assert_eq!(ctx.cpu().pc, BASE);
}

#[test]
fn test_unassigned_opcode_is_illegal() {
    let mut ctx = program(&[0xFF00_1234]);
    ctx.run(1);
    assert_eq!(
        ctx.cpu_mut().interrupts.take(Interrupt::IllegalInstruction),
        0xFF00_1234
    );
}

#[test]
fn test_user_and_system_banks_are_separate() {
    let mut ctx = program(&[op_c("writeu", 1, 2), op_c("readu", 2, 3)]);
    ctx.set_reg(1, 99);
    ctx.run(2);
    assert_eq!(ctx.get_reg(3), 99);
    ctx.cpu_mut().status.s = false;
    assert_eq!(ctx.get_reg(2), 99);
    assert_eq!(ctx.get_reg(1), 0);
}

#[test]
fn test_tset_returns_old_value_and_sets_one() {
    let mut ctx = program(&[op_c("tset", 1, 2), op_c("tset", 1, 3)]);
    ctx.set_reg(1, 0x2000);
    ctx.run(2);
    assert_eq!(ctx.get_reg(2), 0);
    assert_eq!(ctx.get_reg(3), 1);
    assert_eq!(ctx.read_word(0x2000), 1);
    assert_eq!(ctx.cpu().bus.memory.locked_address(), None);
}

#[test]
fn test_float_store_and_load() {
    let mut ctx = program(&[op_e("fstore", 2, 0, 1), op_e("fload", 2, 0, 4)]);
    ctx.cpu_mut().regs.write_f(1, 1.5);
    ctx.set_reg(2, 0x2000);
    ctx.run(2);
    let bits = 1.5f64.to_bits();
    assert_eq!(ctx.read_word(0x2000), (bits >> 32) as u32);
    assert_eq!(ctx.read_word(0x2004), bits as u32);
    assert_eq!(ctx.cpu().regs.read_f(4), 1.5);
}

#[test]
fn test_int_float_conversions() {
    let mut ctx = program(&[
        op_c("itof", 1, 2),
        op_d("fmul", 2, 2, 3),
        op_c("ftoi", 3, 4),
    ]);
    ctx.set_reg(1, (-3i32) as u32);
    ctx.run(3);
    assert_eq!(ctx.cpu().regs.read_f(3), 9.0);
    assert_eq!(ctx.get_reg(4), 9);
}

#[test]
fn test_ftoi_of_nan_is_arithmetic_exception() {
    let mut ctx = program(&[op_c("ftoi", 1, 4)]);
    ctx.cpu_mut().regs.write_f(1, f64::NAN);
    ctx.run(1);
    assert!(ctx.cpu().interrupts.is_pending(Interrupt::ArithmeticException));
    assert_eq!(ctx.cpu().pc, BASE);
}

#[test]
fn test_debug2_prints_to_the_console() {
    let mut ctx = program(&[op_a("debug2"), op_a("debug2")]);
    ctx.set_reg(1, 1);
    ctx.set_reg(2, (-42i32) as u32);
    ctx.run(1);
    ctx.set_reg(1, 2);
    ctx.set_reg(2, u32::from(b'!'));
    ctx.run(1);
    assert_eq!(ctx.output_string(), "-42!");
}

#[test]
fn test_debug_halts_after_advancing() {
    let mut ctx = program(&[op_a("debug"), op_a("nop")]);
    ctx.run(5);
    assert_eq!(ctx.cpu().halted, Some(HaltReason::Debug));
    assert_eq!(ctx.cpu().pc, BASE + 4);
}

#[test]
fn test_page_table_registers() {
    let mut ctx = program(&[op_b("ldptbr", 1), op_b("ldptlr", 2)]);
    ctx.set_reg(1, 0x4000);
    ctx.set_reg(2, 64);
    ctx.run(2);
    assert_eq!(ctx.cpu().ptbr, 0x4000);
    assert_eq!(ctx.cpu().ptlr, 64);
}

const PTBR: u32 = 0x0001_0000;
const FRAME: u32 = 0x0004_0000;

/// A program with paging off whose page table maps logical page 1 to `FRAME`.
fn mapped_program(words: &[u32]) -> TestContext {
    let mut ctx = program(words);
    ctx.write_word(PTBR + 4, FRAME | PTE_VALID | PTE_WRITABLE);
    ctx.cpu_mut().ptbr = PTBR;
    ctx.cpu_mut().ptlr = 4 * 4;
    assert!(!ctx.cpu().status.p);
    ctx
}

#[test]
fn test_loadv_uses_the_page_table_with_paging_off() {
    let mut ctx = mapped_program(&[op_e("loadv", 2, 0x10, 3), op_e("load", 2, 0x10, 4)]);
    ctx.write_word(FRAME + 0x10, 0xCAFE);
    ctx.write_word(0x2010, 0x1111);
    ctx.set_reg(2, 0x2000);
    ctx.run(2);
    assert_eq!(ctx.get_reg(3), 0xCAFE);
    assert_eq!(ctx.get_reg(4), 0x1111);
    assert_eq!(ctx.read_word(PTBR + 4) & (PTE_REFERENCED | PTE_DIRTY), PTE_REFERENCED);
}

#[test]
fn test_storev_and_byte_forms_write_through_the_page_table() {
    let mut ctx = mapped_program(&[
        op_d("storev", 2, 4, 1),
        op_e("storebv", 2, 3, 1),
        op_e("loadbv", 2, 3, 5),
    ]);
    ctx.set_reg(1, 0x1234_5677);
    ctx.set_reg(2, 0x2000);
    ctx.set_reg(4, 8);
    ctx.run(3);
    assert_eq!(ctx.read_word(FRAME + 8), 0x1234_5677);
    assert_eq!(ctx.read_word(FRAME), 0x77);
    assert_eq!(ctx.read_word(0x2008), 0);
    assert_eq!(ctx.get_reg(5), 0x77);
    assert_ne!(ctx.read_word(PTBR + 4) & PTE_DIRTY, 0);
}

#[rstest]
#[case(op_e("loadv", 2, 0, 3))]
#[case(op_e("loadbv", 2, 0, 3))]
#[case(op_e("storev", 2, 0, 3))]
#[case(op_d("storebv", 2, 4, 3))]
fn test_paged_access_forms_are_privileged(#[case] word: u32) {
    let mut ctx = mapped_program(&[word]);
    ctx.cpu_mut().status.s = false;
    ctx.set_reg(2, 0x2000);
    ctx.run(1);
    assert!(ctx.cpu().interrupts.is_pending(Interrupt::PrivilegedInstruction));
    assert_eq!(ctx.cpu().pc, BASE);
    assert_eq!(ctx.read_word(PTBR + 4), FRAME | PTE_VALID | PTE_WRITABLE);
}
