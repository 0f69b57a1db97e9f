//! Source diagnostics.
//!
//! The assembler and linker keep going after a recoverable problem so that one run
//! reports as many as possible. Each problem is a `Diagnostic` tagged with the input
//! file and, when known, the source line.

use std::fmt;

/// One error or warning message tied to an input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Input file name (source file for the assembler, object file for the linker).
    pub file: String,
    /// 1-based source line, when the problem can be attributed to one.
    pub line: Option<u32>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic attributed to a source line.
    pub fn at_line(file: &str, line: u32, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            line: Some(line),
            message: message.into(),
        }
    }

    /// Creates a diagnostic for a whole file.
    pub fn in_file(file: &str, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.file, line, self.message),
            None => write!(f, "{}: {}", self.file, self.message),
        }
    }
}
