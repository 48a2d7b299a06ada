//! Check persistence
//!
//! In-memory store owning the check definitions. Checks are created and
//! mutated here only; the evaluation engine treats them as immutable input.

pub mod memory;

pub use memory::{filter_enabled, CheckStore};
