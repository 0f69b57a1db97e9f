//! Interrupt Controller.
//!
//! This module tracks pending interrupts. It provides:
//! 1. **Pending Set:** One bit per class, set by execution or I/O events.
//! 2. **Info Words:** The exception-info word recorded with each raised class.
//! 3. **Selection:** Strict-priority choice of the next deliverable class.

use crate::common::error::{Fault, Interrupt};

/// The pending-interrupt set with per-class info words.
#[derive(Clone, Debug, Default)]
pub struct InterruptController {
    pending: u32,
    info: [u32; 14],
}

impl InterruptController {
    /// Creates a controller with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a class pending with its info word.
    ///
    /// Raising an already pending class replaces its info word.
    #[inline]
    pub fn raise(&mut self, class: Interrupt, info: u32) {
        self.pending |= class.mask();
        self.info[class.index()] = info;
    }

    /// Records a guest fault.
    #[inline]
    pub fn raise_fault(&mut self, fault: Fault) {
        self.raise(fault.class, fault.info);
    }

    /// Whether the class is pending.
    #[inline]
    pub const fn is_pending(&self, class: Interrupt) -> bool {
        self.pending & class.mask() != 0
    }

    /// The raw pending bitmask.
    #[inline]
    pub const fn pending(&self) -> u32 {
        self.pending
    }

    /// The highest-priority deliverable class, if any.
    ///
    /// Maskable classes are skipped while interrupts are disabled.
    ///
    /// # Arguments
    ///
    /// * `enabled` - The status I flag.
    pub fn select_next(&self, enabled: bool) -> Option<Interrupt> {
        if self.pending == 0 {
            return None;
        }
        Interrupt::PRIORITY
            .into_iter()
            .find(|class| self.is_pending(*class) && (enabled || !class.is_maskable()))
    }

    /// Clears a class and returns its info word.
    pub fn take(&mut self, class: Interrupt) -> u32 {
        self.pending &= !class.mask();
        std::mem::take(&mut self.info[class.index()])
    }

    /// Drops every pending class.
    pub fn clear_all(&mut self) {
        self.pending = 0;
        self.info = [0; 14];
    }
}
