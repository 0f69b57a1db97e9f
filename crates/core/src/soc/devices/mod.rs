//! Memory-Mapped I/O Devices.
//!
//! This module contains the machine's devices and the host consoles that back the
//! serial line:
//! 1. **Serial:** One-character input and output registers with status bits.
//! 2. **Disk:** A sector device performing whole-sector DMA transfers.
//! 3. **Consoles:** Terminal/file and in-memory implementations of `Console`.

/// Host console implementations.
pub mod console;

/// Sector-addressed disk controller.
pub mod disk;

/// Serial terminal device.
pub mod serial;

pub use console::{BufferConsole, StdConsole};
pub use disk::{DiskCommand, DiskDevice, DiskStatus};
pub use serial::SerialDevice;

pub use crate::soc::traits::Console;
