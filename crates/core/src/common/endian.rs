//! Canonical Byte Order.
//!
//! Every word the machine stores, and every integer in the object, executable and disk
//! formats, is kept in big-endian order. Conversion is a pure byte swap applied at each
//! load/store boundary on little-endian hosts and a no-op on big-endian hosts.

use super::error::MachineError;

/// Whether the host needs a swap to reach canonical order, fixed at build time.
pub const SWAP_BYTES: bool = cfg!(target_endian = "little");

/// Reverses the byte order of a word. `swap_bytes(swap_bytes(x)) == x` for every `x`.
#[inline(always)]
pub const fn swap_bytes(x: u32) -> u32 {
    ((x & 0x0000_00FF) << 24)
        | ((x & 0x0000_FF00) << 8)
        | ((x & 0x00FF_0000) >> 8)
        | ((x & 0xFF00_0000) >> 24)
}

/// Converts a word read in host order from canonical storage into its value.
#[inline(always)]
pub const fn from_canonical(raw: u32) -> u32 {
    if SWAP_BYTES { swap_bytes(raw) } else { raw }
}

/// Converts a value into the host-order word that stores it canonically.
#[inline(always)]
pub const fn to_canonical(value: u32) -> u32 {
    if SWAP_BYTES { swap_bytes(value) } else { value }
}

/// Decodes a canonical 4-byte sequence.
#[inline(always)]
pub const fn word_from_bytes(bytes: [u8; 4]) -> u32 {
    from_canonical(u32::from_ne_bytes(bytes))
}

/// Encodes a value as its canonical 4-byte sequence.
#[inline(always)]
pub const fn word_to_bytes(value: u32) -> [u8; 4] {
    to_canonical(value).to_ne_bytes()
}

/// Confirms that `SWAP_BYTES` matches the host by decoding a known byte pattern.
///
/// Run once at emulator start-up; a mismatch means every memory word would be garbled.
pub fn verify_host_byte_order() -> Result<(), MachineError> {
    const PATTERN: [u8; 4] = [0x12, 0x34, 0x56, 0x78];
    if word_from_bytes(PATTERN) == 0x1234_5678 && word_to_bytes(0x1234_5678) == PATTERN {
        Ok(())
    } else {
        Err(MachineError::ByteOrder)
    }
}
