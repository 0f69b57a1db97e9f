//! Simulation Management.
//!
//! This module provides the top-level execution environment. It includes:
//! 1. **Loader:** Copies a linked executable into physical memory.
//! 2. **Simulator:** Owns the CPU and drives cycles until the machine halts.

/// Executable loading.
pub mod loader;

/// Top-level run loop.
pub mod simulator;

pub use simulator::Simulator;
