//! Memory Management Unit (MMU).
//!
//! This module translates logical addresses into physical ones. It performs:
//! 1. **Alignment Checks:** Every translated address must be word aligned.
//! 2. **Table Lookup:** Single-level page table addressed by PTBR, bounded by PTLR.
//! 3. **Protection:** Valid and writable checks with faulting-address reporting.
//! 4. **Bookkeeping:** Referenced and dirty maintenance under the memory lock.
//!
//! Translation itself never touches the interrupt controller. Callers that want a
//! fault recorded do so from the returned `Trap`; a probe with `do_updates` off
//! leaves the page table, the pending set and the disk guard untouched.

/// Page table entry layout.
pub mod pte;

use self::pte::{PAGE_INDEX_MASK, PageTableEntry};
use crate::common::constants::{LOGICAL_ADDRESS_LIMIT_MASK, PAGE_OFFSET_MASK, PAGE_SHIFT};
use crate::common::error::{Fault, Interrupt, Trap};
use crate::soc::System;

/// Translation registers and mode, captured from the CPU for one access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranslationContext {
    /// Status P flag.
    pub paging: bool,
    /// Page table base register.
    pub ptbr: u32,
    /// Page table length register, in bytes.
    pub ptlr: u32,
}

/// The kind of access being translated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    /// Read (true) or write (false).
    pub reading: bool,
    /// Write back PTE bits and run the disk-buffer guard.
    pub do_updates: bool,
    /// Use the page table even when paging is off (`loadv`/`storev` family).
    pub force_paging: bool,
}

impl Access {
    /// An ordinary CPU read.
    pub const READ: Self = Self {
        reading: true,
        do_updates: true,
        force_paging: false,
    };

    /// An ordinary CPU write.
    pub const WRITE: Self = Self {
        reading: false,
        do_updates: true,
        force_paging: false,
    };

    /// A side-effect-free read probe, used by the monitor.
    pub const PROBE: Self = Self {
        reading: true,
        do_updates: false,
        force_paging: false,
    };

    /// The same access routed through the page table regardless of status P.
    pub const fn forced(self) -> Self {
        Self {
            force_paging: true,
            ..self
        }
    }
}

/// Translates a logical word address.
///
/// # Arguments
///
/// * `bus` - The system holding physical memory and the disk guard.
/// * `ctx` - Paging flag and page table registers.
/// * `logical` - The logical address; must be word aligned.
/// * `access` - Read/write, update and forcing options.
///
/// # Returns
///
/// The physical address, a guest fault carrying the logical address, or a host
/// error when the memory lock is misused.
pub fn translate(
    bus: &mut System,
    ctx: &TranslationContext,
    logical: u32,
    access: Access,
) -> Result<u32, Trap> {
    if logical % 4 != 0 {
        return Err(Fault::new(Interrupt::AlignmentException, logical).into());
    }

    let memory_size = bus.memory.size();
    if !ctx.paging && !access.force_paging {
        if logical >= memory_size {
            return Err(Fault::new(Interrupt::AddressException, logical).into());
        }
        if access.do_updates {
            bus.check_disk_guard(logical);
        }
        return Ok(logical);
    }

    if logical & LOGICAL_ADDRESS_LIMIT_MASK != 0 {
        return Err(Fault::new(Interrupt::AddressException, logical).into());
    }

    let page = (logical >> PAGE_SHIFT) & PAGE_INDEX_MASK;
    let offset = logical & PAGE_OFFSET_MASK;
    let table_offset = page * 4;
    if table_offset >= ctx.ptlr {
        return Err(Fault::new(Interrupt::PageInvalid, logical).into());
    }
    let pte_addr = match ctx.ptbr.checked_add(table_offset) {
        Some(addr) if addr % 4 == 0 && addr < memory_size => addr,
        _ => return Err(Fault::new(Interrupt::AddressException, logical).into()),
    };

    let entry = PageTableEntry(bus.memory.read_word_locked(pte_addr)?);
    let fault = if !entry.is_valid() {
        Some(Interrupt::PageInvalid)
    } else if !access.reading && !entry.is_writable() {
        Some(Interrupt::PageReadonly)
    } else {
        None
    };
    if let Some(class) = fault {
        bus.memory.unlock(pte_addr)?;
        return Err(Fault::new(class, logical).into());
    }

    let updated = entry.touched(!access.reading);
    let physical = updated.frame() | offset;
    if physical >= memory_size {
        bus.memory.unlock(pte_addr)?;
        return Err(Fault::new(Interrupt::AddressException, logical).into());
    }

    if access.do_updates {
        bus.memory.write_word_and_unlock(pte_addr, updated.0)?;
        bus.check_disk_guard(physical);
    } else {
        bus.memory.unlock(pte_addr)?;
    }
    Ok(physical)
}
