/// Test context and program builders.
pub mod harness;
