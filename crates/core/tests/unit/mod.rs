//! # Unit Components
//!
//! Hub for the unit test tree; each module mirrors a library area.

/// Byte order and shared types.
pub mod common;




/// Object, executable and disk image codecs.
pub mod object;

/// Symbol resolution, relocation patching and layout.
pub mod link;



/// Statistics accounting.
pub mod stats;
