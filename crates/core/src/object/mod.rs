//! Binary Object Formats.
//!
//! This module is the data contract shared by the assembler, the linker and the
//! emulator. Every integer is a 4-byte big-endian word. It provides:
//! 1. **Object Files:** Relocatable `.o` files with symbol, relocation and label tables.
//! 2. **Executables:** Linked images with segment addresses and a label table.
//! 3. **Disk Images:** A magic word followed by 8192-byte sectors.
//! 4. **Codec:** The word/name reader and writer underneath all three.

/// Word and name encoding shared by the file formats.
pub mod codec;

/// Disk image files.
pub mod disk;

/// Format errors.
pub mod error;

/// Linked executable images.
pub mod executable;

/// Relocatable object files.
pub mod object_file;

pub use disk::DiskImage;
pub use error::FormatError;
pub use executable::{Executable, ExecutableLabel};
pub use object_file::{
    LabelRecord, ObjectFile, RelativeTo, RelocationKind, RelocationRecord, Segment, SymbolRecord,
};

/// Object file magic ("BLZo").
pub const OBJECT_MAGIC: u32 = 0x424C_5A6F;
/// Executable magic ("BLZx").
pub const EXECUTABLE_MAGIC: u32 = 0x424C_5A78;
/// Disk image magic ("BLZd").
pub const DISK_MAGIC: u32 = 0x424C_5A64;
/// Section separator ("****").
pub const SEPARATOR: u32 = 0x2A2A_2A2A;
