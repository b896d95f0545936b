//! Interpreter discovery and inspection.

mod finder;
pub mod python_sys;

pub use finder::{InterpreterFinder, PythonInfo, SystemInterpreterFinder};
