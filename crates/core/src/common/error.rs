//! Interrupts, Faults and Host Errors.
//!
//! This module defines the two error tiers of the machine:
//! 1. **Guest Interrupts:** The fourteen interrupt classes, their priority order,
//!    maskability and vector addresses. These only ever change CPU state.
//! 2. **Guest Faults:** A class paired with its exception-info word, produced by
//!    translation and execution and recorded in the interrupt controller.
//! 3. **Host Errors:** `MachineError`, for conditions that stop the emulator itself
//!    (lock misuse, raw out-of-range access, malformed files).

use std::fmt;

use thiserror::Error;

use crate::object::FormatError;

/// The interrupt classes of the machine, each identified by its pending-set bit.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Interrupt {
    /// Machine reset; clears every other pending class.
    PowerOnReset = 0x0001,
    /// Periodic timer expiry.
    Timer = 0x0002,
    /// Disk command completion.
    Disk = 0x0004,
    /// Serial input arrived or output finished.
    Serial = 0x0008,
    /// Unrecoverable hardware condition; clears every other pending class.
    HardwareFault = 0x0010,
    /// Unknown opcode.
    IllegalInstruction = 0x0020,
    /// Divide by zero or failed float-to-integer conversion.
    ArithmeticException = 0x0040,
    /// Address outside physical memory or outside the logical address space.
    AddressException = 0x0080,
    /// Page index beyond the table, or the entry is not valid.
    PageInvalid = 0x0100,
    /// Write to a page whose entry is not writable.
    PageReadonly = 0x0200,
    /// System-only instruction executed in user mode.
    PrivilegedInstruction = 0x0400,
    /// Unaligned word access or branch target.
    AlignmentException = 0x0800,
    /// A fault occurred while pushing interrupt state.
    ExceptionDuringInterrupt = 0x1000,
    /// Software trap raised by `syscall`.
    SyscallTrap = 0x2000,
}

impl Interrupt {
    /// Every class in bit order; the index of a class equals its bit position.
    pub const ALL: [Self; 14] = [
        Self::PowerOnReset,
        Self::Timer,
        Self::Disk,
        Self::Serial,
        Self::HardwareFault,
        Self::IllegalInstruction,
        Self::ArithmeticException,
        Self::AddressException,
        Self::PageInvalid,
        Self::PageReadonly,
        Self::PrivilegedInstruction,
        Self::AlignmentException,
        Self::ExceptionDuringInterrupt,
        Self::SyscallTrap,
    ];

    /// Delivery order, highest priority first.
    pub const PRIORITY: [Self; 14] = [
        Self::PowerOnReset,
        Self::HardwareFault,
        Self::IllegalInstruction,
        Self::ArithmeticException,
        Self::AddressException,
        Self::PageInvalid,
        Self::PageReadonly,
        Self::PrivilegedInstruction,
        Self::AlignmentException,
        Self::ExceptionDuringInterrupt,
        Self::SyscallTrap,
        Self::Timer,
        Self::Disk,
        Self::Serial,
    ];

    /// The pending-set bit of this class.
    #[inline]
    pub const fn mask(self) -> u32 {
        self as u32
    }

    /// Bit position of this class in the pending set.
    #[inline]
    pub const fn index(self) -> usize {
        (self as u32).trailing_zeros() as usize
    }

    /// Handler address: one 4-byte slot per class starting at address 0.
    #[inline]
    pub const fn vector(self) -> u32 {
        4 * (self as u32).trailing_zeros()
    }

    /// Whether the class is ignored while interrupts are disabled (status I clear).
    pub const fn is_maskable(self) -> bool {
        matches!(
            self,
            Self::ArithmeticException | Self::SyscallTrap | Self::Timer | Self::Disk | Self::Serial
        )
    }

    /// Upper-case name used in traces and statistics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::PowerOnReset => "POWER_ON_RESET",
            Self::Timer => "TIMER",
            Self::Disk => "DISK",
            Self::Serial => "SERIAL",
            Self::HardwareFault => "HARDWARE_FAULT",
            Self::IllegalInstruction => "ILLEGAL_INSTRUCTION",
            Self::ArithmeticException => "ARITHMETIC_EXCEPTION",
            Self::AddressException => "ADDRESS_EXCEPTION",
            Self::PageInvalid => "PAGE_INVALID",
            Self::PageReadonly => "PAGE_READONLY",
            Self::PrivilegedInstruction => "PRIVILEGED_INSTRUCTION",
            Self::AlignmentException => "ALIGNMENT_EXCEPTION",
            Self::ExceptionDuringInterrupt => "EXCEPTION_DURING_INTERRUPT",
            Self::SyscallTrap => "SYSCALL_TRAP",
        }
    }
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A guest exception: the class to raise and the exception-info word pushed on dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault {
    /// Interrupt class.
    pub class: Interrupt,
    /// Faulting address, trap number or instruction word; 0 when not applicable.
    pub info: u32,
}

impl Fault {
    /// Creates a fault with an info word.
    #[inline]
    pub const fn new(class: Interrupt, info: u32) -> Self {
        Self { class, info }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:#010x})", self.class, self.info)
    }
}

/// Host-fatal emulator errors.
///
/// These never reach the guest; they unwind to the front end, which reports them and
/// exits with status 1.
#[derive(Debug, Error)]
pub enum MachineError {
    /// Raw word access at an address that is not a multiple of four.
    #[error("unaligned physical access at {addr:#010x}")]
    UnalignedAccess {
        /// Offending physical address.
        addr: u32,
    },

    /// Raw access outside physical memory.
    #[error("physical address {addr:#010x} is outside memory")]
    AddressOutOfRange {
        /// Offending physical address.
        addr: u32,
    },

    /// The memory lock was requested while already held.
    #[error("memory lock requested at {requested:#010x} while held at {held:#010x}")]
    DoubleLock {
        /// Address currently holding the lock.
        held: u32,
        /// Address of the new request.
        requested: u32,
    },

    /// The memory lock was released for an address that does not hold it.
    #[error("memory unlock at {addr:#010x} does not match the held lock ({held:?})")]
    UnlockMismatch {
        /// Lock holder, if any.
        held: Option<u32>,
        /// Address passed to the release.
        addr: u32,
    },

    /// The byte order compiled into the emulator does not match the host.
    #[error("host byte order does not match the compiled configuration")]
    ByteOrder,

    /// An executable does not fit the configured memory.
    #[error("executable does not fit in memory: needs {needed} bytes, have {available}")]
    ProgramTooLarge {
        /// Highest byte address required, exclusive.
        needed: u64,
        /// Configured memory size.
        available: u64,
    },

    /// A malformed object, executable or disk file.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Host I/O failure (disk image, console).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a failed memory or execution step: either a guest fault to deliver
/// through the interrupt controller, or a host-fatal error that stops the emulator.
#[derive(Debug, Error)]
pub enum Trap {
    /// Guest-visible exception.
    #[error("guest fault {0}")]
    Guest(Fault),

    /// Host-fatal error.
    #[error(transparent)]
    Fatal(#[from] MachineError),
}

impl From<Fault> for Trap {
    fn from(fault: Fault) -> Self {
        Self::Guest(fault)
    }
}
