/// Canonical byte order helpers.
pub mod endian;

/// Interrupt class numbering and priorities.
pub mod interrupt;
