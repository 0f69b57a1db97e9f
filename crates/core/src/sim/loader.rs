//! Executable Loader.
//!
//! This module places a linked image into physical memory. It performs:
//! 1. **Size Check:** The highest segment end must fit the configured memory.
//! 2. **Segment Copy:** Text and data bytes are copied to their link addresses.
//! 3. **BSS Clear:** The bss range is zeroed.

use std::path::Path;

use tracing::info;

use crate::common::error::MachineError;
use crate::object::{Executable, ExecutableLabel};
use crate::soc::memory::PhysicalMemory;

/// Reads and decodes an executable file.
///
/// # Arguments
///
/// * `path` - Path to the executable.
pub fn read_executable(path: impl AsRef<Path>) -> Result<Executable, MachineError> {
    Ok(Executable::read_from(path)?)
}

/// Copies an executable into memory.
///
/// # Arguments
///
/// * `memory` - Physical memory to fill.
/// * `exe` - The decoded executable.
///
/// # Returns
///
/// The executable's label table, for the monitor.
pub fn load_executable(
    memory: &mut PhysicalMemory,
    exe: &Executable,
) -> Result<Vec<ExecutableLabel>, MachineError> {
    let needed = exe.end_address();
    let available = u64::from(memory.size());
    if needed > available {
        return Err(MachineError::ProgramTooLarge { needed, available });
    }

    memory.load(exe.text_addr, &exe.text)?;
    memory.load(exe.data_addr, &exe.data)?;
    memory
        .slice_mut(exe.bss_addr, exe.bss_size as usize)?
        .fill(0);

    info!(
        text = format_args!("{:#010x}+{:#x}", exe.text_addr, exe.text.len()),
        data = format_args!("{:#010x}+{:#x}", exe.data_addr, exe.data.len()),
        bss = format_args!("{:#010x}+{:#x}", exe.bss_addr, exe.bss_size),
        "executable loaded"
    );
    Ok(exe.labels.clone())
}
