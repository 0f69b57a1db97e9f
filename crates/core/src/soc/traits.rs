//! Host console abstraction.
//!
//! The serial device talks to the host through this trait so the emulator can run
//! against the terminal, redirected files or an in-memory buffer.

use std::io;

/// Host side of the serial line.
pub trait Console {
    /// Returns the next input byte if one is available, without blocking.
    fn poll(&mut self) -> Option<u8>;

    /// Blocks until an input byte is available.
    ///
    /// # Returns
    ///
    /// `None` once input is exhausted.
    fn wait_byte(&mut self) -> Option<u8>;

    /// Whether the input source has ended and will never produce another byte.
    fn is_exhausted(&self) -> bool;

    /// Sends one output byte to the host.
    fn emit(&mut self, byte: u8) -> io::Result<()>;

    /// Flushes buffered output.
    fn flush(&mut self) -> io::Result<()>;
}
