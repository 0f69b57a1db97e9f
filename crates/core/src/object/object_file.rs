//! Relocatable Object Files.
//!
//! Layout, every integer a big-endian word:
//!
//! ```text
//! magic  has_entry  text_size  data_size  bss_size
//! text bytes                                      ****
//! data bytes                                      ****
//! (number value relative_to name_len name)*  0    ****
//! (type location segment offset relative_to line)* 0  ****
//! (relative_to value name_len name)*  0           ****
//! ```
//!
//! Symbol numbers 1, 2 and 3 stand for the file's own text, data and bss segments
//! and are never written; table records are numbered from 4.

use std::fs;
use std::path::Path;

use super::codec::{Reader, Writer};
use super::error::FormatError;
use super::OBJECT_MAGIC;

/// Relative-to word for an absolute value.
pub const RELATIVE_ABSOLUTE: u32 = 0;
/// Relative-to word for an imported symbol.
pub const RELATIVE_IMPORTED: u32 = 0xFFFF_FFFF;
/// First symbol number available to table records.
pub const FIRST_SYMBOL_NUMBER: u32 = 4;

/// An object file segment, identified by its implicit symbol number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Code.
    Text = 1,
    /// Initialised data.
    Data = 2,
    /// Zero-filled data.
    Bss = 3,
}

impl Segment {
    /// The implicit symbol number of the segment.
    #[inline]
    pub const fn number(self) -> u32 {
        self as u32
    }

    /// The segment with a given symbol number.
    pub const fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(Self::Text),
            2 => Some(Self::Data),
            3 => Some(Self::Bss),
            _ => None,
        }
    }
}

/// What a symbol's value is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelativeTo {
    /// The value is final.
    Absolute,
    /// The value is an offset into one of this file's segments.
    Segment(Segment),
    /// The value is an offset from another record of this file.
    Symbol(u32),
    /// The symbol is defined by another file.
    Imported,
}

impl RelativeTo {
    /// Encodes as the on-disk relative-to word.
    pub const fn to_word(self) -> u32 {
        match self {
            Self::Absolute => RELATIVE_ABSOLUTE,
            Self::Segment(seg) => seg.number(),
            Self::Symbol(n) => n,
            Self::Imported => RELATIVE_IMPORTED,
        }
    }

    /// Decodes an on-disk relative-to word.
    pub const fn from_word(word: u32) -> Self {
        match word {
            RELATIVE_ABSOLUTE => Self::Absolute,
            RELATIVE_IMPORTED => Self::Imported,
            n => match Segment::from_number(n) {
                Some(seg) => Self::Segment(seg),
                None => Self::Symbol(n),
            },
        }
    }
}

/// One symbol table record: an export or an import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Record number (4 and up).
    pub number: u32,
    /// Offset from `relative_to`; unused for imports.
    pub value: u32,
    /// Base of the value.
    pub relative_to: RelativeTo,
    /// Symbol name.
    pub name: String,
}

/// How a relocation patches its target field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelocationKind {
    /// One byte.
    Byte = 1,
    /// Low 16 bits of an instruction or a half word.
    Half = 2,
    /// 24-bit displacement from the instruction address.
    PcRelative24 = 3,
    /// A full word.
    Word = 4,
    /// Upper 16 bits of the value into the low half of a `sethi`.
    SetHi = 5,
    /// Lower 16 bits of the value into the low half of a `setlo`.
    SetLo = 6,
    /// 16-bit displacement from the instruction address.
    PcRelative16 = 7,
}

impl RelocationKind {
    /// Decodes a relocation type word.
    pub const fn from_word(word: u32) -> Option<Self> {
        match word {
            1 => Some(Self::Byte),
            2 => Some(Self::Half),
            3 => Some(Self::PcRelative24),
            4 => Some(Self::Word),
            5 => Some(Self::SetHi),
            6 => Some(Self::SetLo),
            7 => Some(Self::PcRelative16),
            _ => None,
        }
    }

    /// Bytes covered by the patched field, counted from the relocation location.
    pub const fn width(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            _ => 4,
        }
    }

    /// Whether the patched value is a displacement from the patched instruction.
    pub const fn is_pc_relative(self) -> bool {
        matches!(self, Self::PcRelative24 | Self::PcRelative16)
    }
}

/// A field to patch once symbol addresses are known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelocationRecord {
    /// Patch kind.
    pub kind: RelocationKind,
    /// Byte offset of the field (or instruction) within `segment`.
    pub location: u32,
    /// Segment containing the field (text or data).
    pub segment: Segment,
    /// Addend applied to the target's final value.
    pub offset: u32,
    /// Symbol number of the target (segment number or table record).
    pub relative_to: u32,
    /// Source line that produced the field.
    pub source_line: u32,
}

/// A debugging label, carried through to the executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelRecord {
    /// Symbol number the value is measured from (never 0).
    pub relative_to: u32,
    /// Offset from `relative_to`.
    pub value: u32,
    /// Label name.
    pub name: String,
}

/// A relocatable object file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectFile {
    /// Whether this file defines the program entry.
    pub has_entry: bool,
    /// Text segment bytes.
    pub text: Vec<u8>,
    /// Data segment bytes.
    pub data: Vec<u8>,
    /// Size of the zero-filled bss segment.
    pub bss_size: u32,
    /// Exports and imports.
    pub symbols: Vec<SymbolRecord>,
    /// Fields to patch at link time.
    pub relocations: Vec<RelocationRecord>,
    /// Debugging labels.
    pub labels: Vec<LabelRecord>,
}

impl ObjectFile {
    /// Encodes the file.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.word(OBJECT_MAGIC)
            .word(u32::from(self.has_entry))
            .word(self.text.len() as u32)
            .word(self.data.len() as u32)
            .word(self.bss_size);
        w.bytes(&self.text).separator();
        w.bytes(&self.data).separator();

        for sym in &self.symbols {
            w.word(sym.number)
                .word(sym.value)
                .word(sym.relative_to.to_word())
                .name(&sym.name);
        }
        w.word(0).separator();

        for rel in &self.relocations {
            w.word(rel.kind as u32)
                .word(rel.location)
                .word(rel.segment.number())
                .word(rel.offset)
                .word(rel.relative_to)
                .word(rel.source_line);
        }
        w.word(0).separator();

        for label in &self.labels {
            w.word(label.relative_to)
                .word(label.value)
                .name(&label.name);
        }
        w.word(0).separator();
        w.finish()
    }

    /// Decodes a file.
    pub fn decode(data: &[u8]) -> Result<Self, FormatError> {
        let mut r = Reader::new(data);
        r.magic(OBJECT_MAGIC)?;
        let has_entry = r.word()? != 0;
        let text_size = r.word()?;
        let data_size = r.word()?;
        let bss_size = r.word()?;
        let text = r.bytes(text_size as usize)?.to_vec();
        r.separator()?;
        let data_bytes = r.bytes(data_size as usize)?.to_vec();
        r.separator()?;

        let mut symbols = Vec::new();
        loop {
            let number = r.word()?;
            if number == 0 {
                break;
            }
            let value = r.word()?;
            let relative_to = RelativeTo::from_word(r.word()?);
            let name = r.name()?;
            symbols.push(SymbolRecord {
                number,
                value,
                relative_to,
                name,
            });
        }
        r.separator()?;

        let mut relocations = Vec::new();
        loop {
            let kind_word = r.word()?;
            if kind_word == 0 {
                break;
            }
            let kind =
                RelocationKind::from_word(kind_word).ok_or(FormatError::BadRelocationType(kind_word))?;
            let location = r.word()?;
            let segment_word = r.word()?;
            let segment = match Segment::from_number(segment_word) {
                Some(seg @ (Segment::Text | Segment::Data)) => seg,
                _ => return Err(FormatError::BadSegment(segment_word)),
            };
            relocations.push(RelocationRecord {
                kind,
                location,
                segment,
                offset: r.word()?,
                relative_to: r.word()?,
                source_line: r.word()?,
            });
        }
        r.separator()?;

        let mut labels = Vec::new();
        loop {
            let relative_to = r.word()?;
            if relative_to == 0 {
                break;
            }
            let value = r.word()?;
            let name = r.name()?;
            labels.push(LabelRecord {
                relative_to,
                value,
                name,
            });
        }
        r.separator()?;
        r.finish()?;

        Ok(Self {
            has_entry,
            text,
            data: data_bytes,
            bss_size,
            symbols,
            relocations,
            labels,
        })
    }

    /// Reads and decodes a file from disk.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        Self::decode(&fs::read(path)?)
    }

    /// Encodes and writes the file to disk.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        fs::write(path, self.encode())?;
        Ok(())
    }
}
