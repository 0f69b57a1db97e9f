//! Page Table Entry layout.

/// Physical frame address bits.
pub const PTE_FRAME_MASK: u32 = 0xFFFF_E000;
/// Page has been written.
pub const PTE_DIRTY: u32 = 0x8;
/// Page has been accessed.
pub const PTE_REFERENCED: u32 = 0x4;
/// Page may be written.
pub const PTE_WRITABLE: u32 = 0x2;
/// Entry is valid; frame bits are meaningless otherwise.
pub const PTE_VALID: u32 = 0x1;

/// Page index bits of a logical address, after shifting out the offset.
pub const PAGE_INDEX_MASK: u32 = 0x7FF;

/// A decoded page table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageTableEntry(pub u32);

impl PageTableEntry {
    /// Frame base address.
    #[inline]
    pub const fn frame(self) -> u32 {
        self.0 & PTE_FRAME_MASK
    }

    /// Valid bit.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 & PTE_VALID != 0
    }

    /// Writable bit.
    #[inline]
    pub const fn is_writable(self) -> bool {
        self.0 & PTE_WRITABLE != 0
    }

    /// Dirty bit.
    #[inline]
    pub const fn is_dirty(self) -> bool {
        self.0 & PTE_DIRTY != 0
    }

    /// Referenced bit.
    #[inline]
    pub const fn is_referenced(self) -> bool {
        self.0 & PTE_REFERENCED != 0
    }

    /// The entry after an access: Referenced always, Dirty on writes.
    #[inline]
    pub const fn touched(self, writing: bool) -> Self {
        let mut bits = self.0 | PTE_REFERENCED;
        if writing {
            bits |= PTE_DIRTY;
        }
        Self(bits)
    }
}
