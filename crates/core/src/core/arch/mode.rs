//! BLITZ Privilege Modes.
//!
//! The machine has two privilege levels. The mode is the status S flag; it selects the
//! active integer register bank and gates the system-only instructions.

/// Machine privilege mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mode {
    /// User mode: system-only instructions raise PRIVILEGED_INSTRUCTION.
    User = 0,

    /// System mode: full access; entered on every interrupt dispatch.
    System = 1,
}

impl Mode {
    /// Returns the human-readable name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::User => "User",
            Mode::System => "System",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
