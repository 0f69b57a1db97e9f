//! Format errors raised while reading or writing object, executable and disk files.

use thiserror::Error;

/// A malformed or unreadable file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The leading magic word is wrong.
    #[error("bad magic number {found:#010x} (expected {expected:#010x})")]
    BadMagic {
        /// Magic word required by the format.
        expected: u32,
        /// Word actually found.
        found: u32,
    },

    /// The file ended inside a field.
    #[error("file truncated at byte {offset}")]
    Truncated {
        /// Offset of the incomplete field.
        offset: usize,
    },

    /// A section separator is missing.
    #[error("missing section separator at byte {offset}")]
    MissingSeparator {
        /// Offset where the separator was expected.
        offset: usize,
    },

    /// A symbol or label name is not valid UTF-8.
    #[error("invalid name at byte {offset}")]
    BadName {
        /// Offset of the name bytes.
        offset: usize,
    },

    /// A segment number other than text, data or bss.
    #[error("invalid segment number {0}")]
    BadSegment(u32),

    /// An unknown relocation type.
    #[error("invalid relocation type {0}")]
    BadRelocationType(u32),

    /// A sector range outside the disk image.
    #[error("sectors {first}..{end} outside disk of {sectors} sectors")]
    SectorOutOfRange {
        /// First requested sector.
        first: u32,
        /// One past the last requested sector.
        end: u64,
        /// Sectors in the image.
        sectors: u32,
    },

    /// Bytes follow the final separator.
    #[error("{0} unexpected bytes after the final section")]
    TrailingData(usize),

    /// Host I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
