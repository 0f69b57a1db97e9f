//! Assembler errors.

use thiserror::Error;

use crate::common::Diagnostic;

/// Assembly failed: at least one error was reported, so no object was produced.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("assembly failed with {} error(s)", .errors.len())]
pub struct AsmError {
    /// Every error, in source order.
    pub errors: Vec<Diagnostic>,
    /// Warnings reported alongside the errors.
    pub warnings: Vec<Diagnostic>,
}
