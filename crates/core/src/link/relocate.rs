//! Relocation patching.
//!
//! A relocation names a field in the image and the value that belongs there. The
//! field must still be zero: the assembler leaves relocated fields clear, so a
//! non-zero field means two relocations claimed the same bits.

use thiserror::Error;

use crate::common::endian::{word_from_bytes, word_to_bytes};
use crate::isa::encode::{fits_16, fits_signed};
use crate::object::RelocationKind;

/// A relocation that cannot be applied.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// The target bits were already set.
    #[error("previous relocation value not zero at {address:#010x}")]
    NotZero {
        /// Address of the patched field.
        address: u32,
    },

    /// The location lies outside its segment.
    #[error("relocation location {address:#010x} is outside the segment")]
    OutOfBounds {
        /// Address of the patched field.
        address: u32,
    },
}

/// Field mask, in the big-endian word at the location, for the word-based kinds.
const fn word_mask(kind: RelocationKind) -> u32 {
    match kind {
        RelocationKind::PcRelative24 => 0x00FF_FFFF,
        RelocationKind::SetHi | RelocationKind::SetLo | RelocationKind::PcRelative16 => 0xFFFF,
        _ => 0xFFFF_FFFF,
    }
}

/// Applies one relocation.
///
/// # Arguments
///
/// * `image` - The segment image.
/// * `index` - Byte offset of the field within `image`.
/// * `address` - Absolute address of the field (the instruction for PC-relative kinds).
/// * `kind` - Field kind.
/// * `value` - Target value plus addend.
///
/// # Returns
///
/// A warning when the value does not fit the field, or the error that stops the link.
pub fn patch(
    image: &mut [u8],
    index: usize,
    address: u32,
    kind: RelocationKind,
    value: u32,
) -> Result<Option<String>, PatchError> {
    let width = kind.width() as usize;
    let field = image
        .get_mut(index..index + width)
        .ok_or(PatchError::OutOfBounds { address })?;

    let mut warning = None;
    match kind {
        RelocationKind::Byte => {
            if field[0] != 0 {
                return Err(PatchError::NotZero { address });
            }
            if !(-128..=255).contains(&i64::from(value as i32)) {
                warning = Some(format!("value {value:#x} truncated to 8 bits"));
            }
            field[0] = value as u8;
        }
        RelocationKind::Half => {
            if field.iter().any(|b| *b != 0) {
                return Err(PatchError::NotZero { address });
            }
            if !fits_16(i64::from(value as i32)) {
                warning = Some(format!("value {value:#x} truncated to 16 bits"));
            }
            field.copy_from_slice(&(value as u16).to_be_bytes());
        }
        _ => {
            let mask = word_mask(kind);
            let word = word_from_bytes([field[0], field[1], field[2], field[3]]);
            if word & mask != 0 {
                return Err(PatchError::NotZero { address });
            }
            let bits = if kind == RelocationKind::SetHi {
                value >> 16
            } else if kind.is_pc_relative() {
                let displacement = value.wrapping_sub(address) as i32;
                let width = if kind == RelocationKind::PcRelative24 { 24 } else { 16 };
                if !fits_signed(i64::from(displacement), width) {
                    warning = Some(format!(
                        "displacement {displacement} does not fit in {width} bits"
                    ));
                }
                displacement as u32
            } else {
                value
            };
            field.copy_from_slice(&word_to_bytes(word | (bits & mask)));
        }
    }
    Ok(warning)
}
