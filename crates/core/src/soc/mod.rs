//! System Components.
//!
//! This module organizes the components that make up the simulated machine outside
//! the CPU: physical memory with its lock, the memory-mapped device registers, the
//! serial and disk devices, the discrete event scheduler, and the builder that
//! assembles them into a `System`.

/// System builder and the top-level `System` type.
pub mod builder;

/// Serial and disk device implementations.
pub mod devices;

/// Memory-mapped I/O routing.
pub mod interconnect;

/// Physical memory and the word lock.
pub mod memory;

/// Discrete event scheduler and jitter generator.
pub mod scheduler;

/// Host-side console trait used by the serial device.
pub mod traits;

pub use builder::System;
pub use traits::Console;
