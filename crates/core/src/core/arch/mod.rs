//! BLITZ architecture-specific components.
//!
//! This module contains the architectural state that is not plain registers:
//! 1. **Interrupts:** The pending set, per-class info words and priority selection.
//! 2. **Modes:** User and system mode, selecting the active register bank.
//! 3. **Status:** The six-flag status word and its packing.

/// Interrupt controller: pending set and priority selection.
pub mod interrupts;

/// Privilege mode definitions.
pub mod mode;

/// Status register flags.
pub mod status;
