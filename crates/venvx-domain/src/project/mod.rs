//! Project discovery and the `[tool.venvx]` manifest table.

mod prefix;
mod snapshot;

pub use prefix::venv_prefix;
pub use snapshot::{
    current_project_root, discover_project_root, ProjectSnapshot, ToolSettings, IN_PROJECT_DIR,
    PYPROJECT_FILE,
};
