//! Serial Terminal Device.
//!
//! Implements the one-character serial line. It provides:
//! 1. **Status Register:** Bit 0 set when an input character is waiting, bit 1 set
//!    when the transmitter can accept a character.
//! 2. **Data Register:** Reading takes the waiting character; writing starts a
//!    transmission that completes after the configured per-character delay.
//! 3. **Misuse Reporting:** Overruns and writes to a busy transmitter are logged and
//!    the affected character is lost.

use std::io;

use tracing::warn;

use super::Console;

/// Status bit: an input character is available.
pub const SERIAL_INPUT_AVAILABLE: u32 = 0x1;
/// Status bit: the transmitter is ready for a character.
pub const SERIAL_OUTPUT_READY: u32 = 0x2;

/// The serial device and its host console.
pub struct SerialDevice {
    console: Box<dyn Console>,
    input_char: u8,
    input_available: bool,
    output_char: Option<u8>,
}

impl std::fmt::Debug for SerialDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialDevice")
            .field("input_char", &self.input_char)
            .field("input_available", &self.input_available)
            .field("output_char", &self.output_char)
            .finish_non_exhaustive()
    }
}

impl SerialDevice {
    /// Creates an idle serial device on `console`.
    pub fn new(console: Box<dyn Console>) -> Self {
        Self {
            console,
            input_char: 0,
            input_available: false,
            output_char: None,
        }
    }

    /// Clears device state; the console is kept.
    pub fn reset(&mut self) {
        self.input_char = 0;
        self.input_available = false;
        self.output_char = None;
    }

    /// The status register.
    pub fn status(&self) -> u32 {
        let mut status = 0;
        if self.input_available {
            status |= SERIAL_INPUT_AVAILABLE;
        }
        if self.output_char.is_none() {
            status |= SERIAL_OUTPUT_READY;
        }
        status
    }

    /// Reads the data register, consuming the waiting character.
    pub fn read_data(&mut self) -> u32 {
        self.input_available = false;
        u32::from(self.input_char)
    }

    /// Writes the data register.
    ///
    /// # Returns
    ///
    /// `true` when a transmission started; `false` when the transmitter was busy and
    /// the character was dropped.
    pub fn write_data(&mut self, value: u32) -> bool {
        let byte = (value & 0xFF) as u8;
        if let Some(busy) = self.output_char {
            warn!(
                dropped = byte,
                in_flight = busy,
                "serial output written while transmitter busy"
            );
            return false;
        }
        self.output_char = Some(byte);
        true
    }

    /// Whether a transmission is in flight.
    pub fn is_transmitting(&self) -> bool {
        self.output_char.is_some()
    }

    /// Completes the in-flight transmission by handing the character to the host.
    pub fn complete_output(&mut self) -> io::Result<()> {
        match self.output_char.take() {
            Some(byte) => self.console.emit(byte),
            None => Ok(()),
        }
    }

    /// Latches a received character, overwriting an unread one.
    pub fn receive(&mut self, byte: u8) {
        if self.input_available {
            warn!(
                lost = self.input_char,
                received = byte,
                "serial input overrun"
            );
        }
        self.input_char = byte;
        self.input_available = true;
    }

    /// Polls the host for a character without blocking.
    pub fn poll_host(&mut self) -> Option<u8> {
        self.console.poll()
    }

    /// Blocks on the host for a character.
    pub fn wait_host(&mut self) -> Option<u8> {
        self.console.wait_byte()
    }

    /// Whether host input has ended.
    pub fn host_exhausted(&self) -> bool {
        self.console.is_exhausted()
    }

    /// Writes bytes straight to the host, bypassing the device timing.
    pub fn write_host(&mut self, bytes: &[u8]) -> io::Result<()> {
        for byte in bytes {
            self.console.emit(*byte)?;
        }
        Ok(())
    }

    /// Flushes host output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.console.flush()
    }
}
