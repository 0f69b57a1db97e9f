//! Linked Executables.
//!
//! Layout, every integer a big-endian word:
//!
//! ```text
//! magic  text_size data_size bss_size  text_addr data_addr bss_addr  ****
//! text bytes  ****
//! data bytes  ****
//! (name_len name value)*  0  ****
//! ```

use std::fs;
use std::path::Path;

use super::EXECUTABLE_MAGIC;
use super::codec::{Reader, Writer};
use super::error::FormatError;

/// A label carried into the executable for debugging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutableLabel {
    /// Label name.
    pub name: String,
    /// Absolute address.
    pub value: u32,
}

/// A linked program image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Executable {
    /// Load address of the text segment (the entry point).
    pub text_addr: u32,
    /// Load address of the data segment.
    pub data_addr: u32,
    /// Address of the bss segment.
    pub bss_addr: u32,
    /// Text bytes.
    pub text: Vec<u8>,
    /// Data bytes.
    pub data: Vec<u8>,
    /// Bss size in bytes.
    pub bss_size: u32,
    /// Label table.
    pub labels: Vec<ExecutableLabel>,
}

impl Executable {
    /// One past the last byte the image occupies.
    pub fn end_address(&self) -> u64 {
        let text_end = u64::from(self.text_addr) + self.text.len() as u64;
        let data_end = u64::from(self.data_addr) + self.data.len() as u64;
        let bss_end = u64::from(self.bss_addr) + u64::from(self.bss_size);
        text_end.max(data_end).max(bss_end)
    }

    /// Encodes the image.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.word(EXECUTABLE_MAGIC)
            .word(self.text.len() as u32)
            .word(self.data.len() as u32)
            .word(self.bss_size)
            .word(self.text_addr)
            .word(self.data_addr)
            .word(self.bss_addr)
            .separator();
        w.bytes(&self.text).separator();
        w.bytes(&self.data).separator();
        for label in &self.labels {
            w.name(&label.name).word(label.value);
        }
        w.word(0).separator();
        w.finish()
    }

    /// Decodes an image.
    pub fn decode(data: &[u8]) -> Result<Self, FormatError> {
        let mut r = Reader::new(data);
        r.magic(EXECUTABLE_MAGIC)?;
        let text_size = r.word()?;
        let data_size = r.word()?;
        let bss_size = r.word()?;
        let text_addr = r.word()?;
        let data_addr = r.word()?;
        let bss_addr = r.word()?;
        r.separator()?;
        let text = r.bytes(text_size as usize)?.to_vec();
        r.separator()?;
        let data_bytes = r.bytes(data_size as usize)?.to_vec();
        r.separator()?;

        let mut labels = Vec::new();
        loop {
            let len = r.word()?;
            if len == 0 {
                break;
            }
            let name = r.name_of_len(len)?;
            let value = r.word()?;
            labels.push(ExecutableLabel { name, value });
        }
        r.separator()?;
        r.finish()?;

        Ok(Self {
            text_addr,
            data_addr,
            bss_addr,
            text,
            data: data_bytes,
            bss_size,
            labels,
        })
    }

    /// Reads and decodes an image from disk.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        Self::decode(&fs::read(path)?)
    }

    /// Encodes and writes the image to disk.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        fs::write(path, self.encode())?;
        Ok(())
    }
}
