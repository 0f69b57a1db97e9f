//! # MMU Tests
//!
//! Page table walks, protection faults, referenced/dirty maintenance and the
//! side-effect-free probe.

use blitz_core::common::{Fault, Interrupt, Trap};
use blitz_core::core::units::mmu::pte::{
    PTE_DIRTY, PTE_REFERENCED, PTE_VALID, PTE_WRITABLE, PageTableEntry,
};
use blitz_core::core::units::mmu::{Access, TranslationContext, translate};
use blitz_core::object::DiskImage;
use blitz_core::soc::System;
use std::io::Cursor;

use crate::common::harness::{TestContext, quiet_config};

const PTBR: u32 = 0x0001_0000;
const FRAME: u32 = 0x0004_0000;

fn paged() -> TranslationContext {
    TranslationContext {
        paging: true,
        ptbr: PTBR,
        ptlr: 4 * 4,
    }
}

/// Maps logical page 1 to `FRAME` with the given PTE bits.
fn map_page(ctx: &mut TestContext, bits: u32) {
    ctx.write_word(PTBR + 4, FRAME | bits);
}

fn pte(ctx: &TestContext) -> u32 {
    ctx.read_word(PTBR + 4)
}

fn fault(result: Result<u32, Trap>) -> Fault {
    match result {
        Err(Trap::Guest(f)) => f,
        other => panic!("expected a guest fault, got {other:?}"),
    }
}

#[test]
fn test_read_sets_referenced_and_write_sets_dirty() {
    let mut ctx = TestContext::new();
    map_page(&mut ctx, PTE_VALID | PTE_WRITABLE);

    let phys = translate(&mut ctx.sim.cpu.bus, &paged(), 0x2010, Access::READ).unwrap();
    assert_eq!(phys, FRAME + 0x10);
    assert_eq!(pte(&ctx) & (PTE_REFERENCED | PTE_DIRTY), PTE_REFERENCED);

    translate(&mut ctx.sim.cpu.bus, &paged(), 0x2010, Access::WRITE).unwrap();
    let entry = PageTableEntry(pte(&ctx));
    assert!(entry.is_referenced() && entry.is_dirty());
    assert_eq!(entry.frame(), FRAME);
    assert_eq!(ctx.sim.cpu.bus.memory.locked_address(), None);
}

#[test]
fn test_probe_leaves_page_table_untouched() {
    let mut ctx = TestContext::new();
    map_page(&mut ctx, PTE_VALID);
    let before = pte(&ctx);

    let phys = translate(&mut ctx.sim.cpu.bus, &paged(), 0x2004, Access::PROBE).unwrap();
    assert_eq!(phys, FRAME + 4);
    assert_eq!(pte(&ctx), before);
}

#[test]
fn test_probe_reports_the_same_fault_without_side_effects() {
    let mut ctx = TestContext::new();
    ctx.sim.cpu.interrupts.clear_all();
    map_page(&mut ctx, 0);
    let before = pte(&ctx);

    let probed = fault(translate(&mut ctx.sim.cpu.bus, &paged(), 0x2000, Access::PROBE));
    let real = fault(translate(&mut ctx.sim.cpu.bus, &paged(), 0x2000, Access::READ));
    assert_eq!(probed, real);
    assert_eq!(probed, Fault::new(Interrupt::PageInvalid, 0x2000));
    assert_eq!(pte(&ctx), before);
    assert_eq!(ctx.sim.cpu.interrupts.pending(), 0);
    assert_eq!(ctx.sim.cpu.bus.memory.locked_address(), None);
}

#[test]
fn test_probe_skips_the_disk_guard() {
    let mut config = quiet_config();
    config.timing.disk_jitter = 0;
    let image = DiskImage::format(Box::new(Cursor::new(Vec::new())), 4).unwrap();
    let mut ctx = TestContext::build(config, b"", Some(image));
    let map = ctx.sim.cpu.bus.map;
    let bus: &mut System = &mut ctx.sim.cpu.bus;
    bus.write_word(map.disk_memory_addr, 0x8000).unwrap();
    bus.write_word(map.disk_sector_addr, 0).unwrap();
    bus.write_word(map.disk_count_addr, 1).unwrap();
    bus.write_word(map.disk_command_addr, 1).unwrap();
    assert!(bus.disk.is_busy());

    let flat = TranslationContext::default();
    translate(bus, &flat, 0x8100, Access::PROBE).unwrap();
    assert!(!bus.take_halt_request());
    translate(bus, &flat, 0x8100, Access::READ).unwrap();
    assert!(bus.take_halt_request());
}

#[test]
fn test_write_to_readonly_page() {
    let mut ctx = TestContext::new();
    map_page(&mut ctx, PTE_VALID);
    let f = fault(translate(&mut ctx.sim.cpu.bus, &paged(), 0x2008, Access::WRITE));
    assert_eq!(f, Fault::new(Interrupt::PageReadonly, 0x2008));
    assert_eq!(pte(&ctx), FRAME | PTE_VALID);
}

#[test]
fn test_page_beyond_table_length_is_invalid() {
    let mut ctx = TestContext::new();
    let f = fault(translate(&mut ctx.sim.cpu.bus, &paged(), 4 * 0x2000, Access::READ));
    assert_eq!(f, Fault::new(Interrupt::PageInvalid, 0x8000));
}

#[test]
fn test_unaligned_address() {
    let mut ctx = TestContext::new();
    let f = fault(translate(
        &mut ctx.sim.cpu.bus,
        &TranslationContext::default(),
        0x102,
        Access::READ,
    ));
    assert_eq!(f, Fault::new(Interrupt::AlignmentException, 0x102));
}

#[test]
fn test_unpaged_address_beyond_memory() {
    let mut ctx = TestContext::new();
    let size = ctx.sim.cpu.bus.memory.size();
    let f = fault(translate(
        &mut ctx.sim.cpu.bus,
        &TranslationContext::default(),
        size,
        Access::READ,
    ));
    assert_eq!(f.class, Interrupt::AddressException);
}

#[test]
fn test_logical_address_limit() {
    let mut ctx = TestContext::new();
    let f = fault(translate(&mut ctx.sim.cpu.bus, &paged(), 0x0100_0000, Access::READ));
    assert_eq!(f, Fault::new(Interrupt::AddressException, 0x0100_0000));
}

#[test]
fn test_forced_access_uses_the_table_with_paging_off() {
    let mut ctx = TestContext::new();
    map_page(&mut ctx, PTE_VALID);
    let ctx_off = TranslationContext {
        paging: false,
        ..paged()
    };
    let phys =
        translate(&mut ctx.sim.cpu.bus, &ctx_off, 0x2000, Access::READ.forced()).unwrap();
    assert_eq!(phys, FRAME);
}

const WRITE_PREVIEW: Access = Access {
    reading: false,
    do_updates: false,
    force_paging: false,
};

#[test]
fn test_write_preview_leaves_referenced_and_dirty_clear() {
    let mut ctx = TestContext::new();
    map_page(&mut ctx, PTE_VALID | PTE_WRITABLE);
    let before = pte(&ctx);

    let phys = translate(&mut ctx.sim.cpu.bus, &paged(), 0x200C, WRITE_PREVIEW).unwrap();
    assert_eq!(phys, FRAME + 0xC);
    assert_eq!(pte(&ctx), before);
    assert_eq!(ctx.sim.cpu.bus.memory.locked_address(), None);
}

#[test]
fn test_write_preview_of_readonly_page_reports_without_side_effects() {
    let mut ctx = TestContext::new();
    ctx.sim.cpu.interrupts.clear_all();
    map_page(&mut ctx, PTE_VALID | PTE_REFERENCED);
    let before = pte(&ctx);

    let previewed = fault(translate(&mut ctx.sim.cpu.bus, &paged(), 0x2008, WRITE_PREVIEW));
    assert_eq!(previewed, Fault::new(Interrupt::PageReadonly, 0x2008));
    assert_eq!(pte(&ctx), before);
    assert_eq!(ctx.sim.cpu.interrupts.pending(), 0);
    assert_eq!(ctx.sim.cpu.bus.memory.locked_address(), None);
}
