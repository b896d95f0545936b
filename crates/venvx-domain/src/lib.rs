#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod project;

pub use project::{
    current_project_root, discover_project_root, venv_prefix, ProjectSnapshot, ToolSettings,
    IN_PROJECT_DIR, PYPROJECT_FILE,
};
