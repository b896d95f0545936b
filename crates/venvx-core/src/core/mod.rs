//! Internal implementation modules for `venvx-core`.
//!
//! Callers go through the re-exports in the crate root.

pub mod config;
pub mod python;
pub mod runtime;
pub mod tooling;
pub mod venv;
