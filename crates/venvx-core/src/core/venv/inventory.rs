use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::errors::VenvError;
use crate::settings::ProjectConfig;

/// Key under which the in-project `.venv` is listed.
pub const IN_PROJECT_KEY: &str = "in-project";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VenvEntry {
    pub key: String,
    pub path: PathBuf,
    pub python: Option<PathBuf>,
}

impl VenvEntry {
    fn at(key: String, path: PathBuf) -> Self {
        let python = Some(venv_python_path(&path)).filter(|python| python.exists());
        Self { key, path, python }
    }
}

/// Interpreter location inside an environment rooted at `location`.
#[must_use]
pub fn venv_python_path(location: &Path) -> PathBuf {
    if cfg!(windows) {
        location.join("Scripts").join("python.exe")
    } else {
        location.join("bin").join("python")
    }
}

/// Environments belonging to `project`: the in-project `.venv` first, then
/// every prefixed directory under the venv location, ordered by key.
///
/// # Errors
/// Returns an error when the venv location exists but cannot be read.
pub fn list_venvs(project: &ProjectConfig) -> Result<Vec<VenvEntry>, VenvError> {
    let mut entries = Vec::new();
    let in_project = project.in_project_location();
    if in_project.is_dir() {
        entries.push(VenvEntry::at(IN_PROJECT_KEY.to_string(), in_project));
    }
    let parent = &project.venv_location;
    if !parent.is_dir() {
        debug!(location = %parent.display(), "venv location does not exist yet");
        return Ok(entries);
    }
    let read = fs::read_dir(parent).map_err(|err| VenvError::io("reading", parent, err))?;
    let mut named = Vec::new();
    for entry in read {
        let entry = entry.map_err(|err| VenvError::io("reading", parent, err))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(key) = file_name.strip_prefix(&project.prefix) else {
            continue;
        };
        if key.is_empty() || !entry.path().is_dir() {
            continue;
        }
        named.push(VenvEntry::at(key.to_string(), entry.path()));
    }
    named.sort_by(|left, right| left.key.cmp(&right.key));
    entries.extend(named);
    Ok(entries)
}

/// # Errors
/// Propagates listing failures.
pub fn find_venv(project: &ProjectConfig, key: &str) -> Result<Option<VenvEntry>, VenvError> {
    Ok(list_venvs(project)?
        .into_iter()
        .find(|entry| entry.key == key))
}

/// Deletes the environment registered under `key`.
///
/// # Errors
/// Returns [`VenvError::VenvNotFound`] for unknown keys.
pub fn remove_venv(project: &ProjectConfig, key: &str) -> Result<VenvEntry, VenvError> {
    let entry = find_venv(project, key)?.ok_or_else(|| VenvError::VenvNotFound {
        key: key.to_string(),
    })?;
    warn!("Removing virtualenv {}", entry.path.display());
    fs::remove_dir_all(&entry.path).map_err(|err| VenvError::io("removing", &entry.path, err))?;
    Ok(entry)
}
