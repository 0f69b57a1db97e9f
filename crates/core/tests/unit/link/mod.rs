/// Fixed-point symbol resolution.
pub mod symbols;
