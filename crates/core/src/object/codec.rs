//! Word codec.
//!
//! `Writer` and `Reader` move 32-bit words, raw byte blocks and length-prefixed
//! names in canonical byte order.

use super::SEPARATOR;
use super::error::FormatError;
use crate::common::endian::{word_from_bytes, word_to_bytes};

/// Appends canonical words to a byte buffer.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one word.
    pub fn word(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&word_to_bytes(value));
        self
    }

    /// Appends raw bytes.
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    /// Appends a name as its length followed by its bytes.
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.word(name.len() as u32).bytes(name.as_bytes())
    }

    /// Appends a section separator.
    pub fn separator(&mut self) -> &mut Self {
        self.word(SEPARATOR)
    }

    /// Returns the encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads canonical words from a byte slice.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads one word.
    pub fn word(&mut self) -> Result<u32, FormatError> {
        let bytes = self.bytes(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(word_from_bytes(raw))
    }

    /// Reads `len` raw bytes.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(FormatError::Truncated { offset: self.pos })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Reads a name of `len` bytes.
    pub fn name_of_len(&mut self, len: u32) -> Result<String, FormatError> {
        let offset = self.pos;
        let bytes = self.bytes(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FormatError::BadName { offset })
    }

    /// Reads a length-prefixed name.
    pub fn name(&mut self) -> Result<String, FormatError> {
        let len = self.word()?;
        self.name_of_len(len)
    }

    /// Consumes a section separator.
    pub fn separator(&mut self) -> Result<(), FormatError> {
        let offset = self.pos;
        if self.word()? != SEPARATOR {
            return Err(FormatError::MissingSeparator { offset });
        }
        Ok(())
    }

    /// Consumes and checks a magic word.
    pub fn magic(&mut self, expected: u32) -> Result<(), FormatError> {
        let found = self.word()?;
        if found != expected {
            return Err(FormatError::BadMagic { expected, found });
        }
        Ok(())
    }

    /// Fails when unread bytes remain.
    pub fn finish(self) -> Result<(), FormatError> {
        let rest = self.data.len() - self.pos;
        if rest != 0 {
            return Err(FormatError::TrailingData(rest));
        }
        Ok(())
    }
}
