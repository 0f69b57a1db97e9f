//! Host consoles.
//!
//! `StdConsole` connects the serial line to the host: terminal input is read by a
//! helper thread feeding a channel so that polling never blocks the machine, while
//! redirected file input is consumed directly so runs stay deterministic.
//! `BufferConsole` keeps both directions in memory for tests and embedding.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::warn;

use super::Console;

/// Where console input comes from.
enum Input {
    /// Bytes delivered by the stdin reader thread.
    Terminal(Receiver<u8>),
    /// Bytes read up front from a file.
    File(VecDeque<u8>),
}

/// Console backed by the host terminal or by redirected files.
pub struct StdConsole {
    input: Input,
    exhausted: bool,
    output: Box<dyn Write + Send>,
}

impl std::fmt::Debug for StdConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdConsole")
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl StdConsole {
    /// Creates a console on stdin/stdout.
    ///
    /// Spawns a background thread to read from stdin.
    pub fn new() -> Self {
        let (tx, rx) = channel();

        thread::spawn(move || {
            let mut buffer = [0u8; 1];
            let stdin = io::stdin();
            let mut handle = stdin.lock();
            while handle.read_exact(&mut buffer).is_ok() {
                if tx.send(buffer[0]).is_err() {
                    break;
                }
            }
        });

        Self {
            input: Input::Terminal(rx),
            exhausted: false,
            output: Box::new(io::stdout()),
        }
    }

    /// Creates a console with optional input and output redirection.
    ///
    /// # Arguments
    ///
    /// * `input` - File whose bytes become serial input; stdin when `None`.
    /// * `output` - File receiving serial output; stdout when `None`.
    pub fn with_files(input: Option<&Path>, output: Option<&Path>) -> io::Result<Self> {
        let mut console = match input {
            Some(path) => Self {
                input: Input::File(std::fs::read(path)?.into()),
                exhausted: false,
                output: Box::new(io::stdout()),
            },
            None => Self::new(),
        };
        if let Some(path) = output {
            console.output = Box::new(BufWriter::new(File::create(path)?));
        }
        Ok(console)
    }
}

impl StdConsole {
    /// Creates a console with no serial input, writing to stdout.
    ///
    /// Used when stdin belongs to the interactive monitor.
    pub fn output_only() -> Self {
        Self {
            input: Input::File(VecDeque::new()),
            exhausted: true,
            output: Box::new(io::stdout()),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn poll(&mut self) -> Option<u8> {
        match &mut self.input {
            Input::Terminal(rx) => match rx.try_recv() {
                Ok(byte) => Some(byte),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    self.exhausted = true;
                    None
                }
            },
            Input::File(bytes) => {
                let byte = bytes.pop_front();
                self.exhausted = bytes.is_empty();
                byte
            }
        }
    }

    fn wait_byte(&mut self) -> Option<u8> {
        if let Err(e) = self.output.flush() {
            warn!(error = %e, "serial output flush failed before blocking on input");
        }
        match &mut self.input {
            Input::Terminal(rx) => match rx.recv() {
                Ok(byte) => Some(byte),
                Err(_) => {
                    self.exhausted = true;
                    None
                }
            },
            Input::File(_) => self.poll(),
        }
    }

    fn is_exhausted(&self) -> bool {
        match &self.input {
            Input::Terminal(_) => self.exhausted,
            Input::File(bytes) => bytes.is_empty(),
        }
    }

    fn emit(&mut self, byte: u8) -> io::Result<()> {
        self.output.write_all(&[byte])?;
        if byte == b'\n' {
            self.output.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

/// In-memory console: scripted input, captured output.
#[derive(Debug, Default)]
pub struct BufferConsole {
    input: VecDeque<u8>,
    output: Arc<Mutex<Vec<u8>>>,
}

impl BufferConsole {
    /// Creates a console that will deliver `input` one byte per poll.
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle on the captured output that stays valid after the console moves.
    pub fn output_handle(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.output)
    }
}

impl Console for BufferConsole {
    fn poll(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn wait_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn is_exhausted(&self) -> bool {
        self.input.is_empty()
    }

    fn emit(&mut self, byte: u8) -> io::Result<()> {
        self.output
            .lock()
            .map_err(|_| io::Error::other("console output poisoned"))?
            .push(byte);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
