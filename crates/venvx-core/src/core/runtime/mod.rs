//! Process execution and the effect seams the rest of the crate runs through.

pub mod effects;
pub mod process;
