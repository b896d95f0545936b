use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use venvx_domain::{venv_prefix, ProjectSnapshot, IN_PROJECT_DIR};

use crate::core::venv::BackendKind;

const LOCATION_ENV: &str = "VENVX_LOCATION";
const BACKEND_ENV: &str = "VENVX_BACKEND";
const IN_PROJECT_ENV: &str = "VENVX_IN_PROJECT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    #[must_use]
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Interprets a variable as a boolean switch; unset yields `None`.
    #[must_use]
    pub fn switch(&self, key: &str) -> Option<bool> {
        self.var(key).map(|value| {
            let lowered = value.trim().to_ascii_lowercase();
            matches!(lowered.as_str(), "1" | "true" | "yes" | "on")
        })
    }

    #[must_use]
    pub fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

/// Settled configuration for one project: manifest values layered under
/// environment overrides, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub venv_location: PathBuf,
    pub prefix: String,
    pub backend: BackendKind,
    pub in_project: bool,
    pub python: Option<String>,
}

impl ProjectConfig {
    /// Builds the configuration for `project`, letting `env` override the
    /// manifest.
    ///
    /// # Errors
    /// Returns an error for an unknown backend name or when no default venv
    /// location can be determined.
    pub fn from_snapshot(project: &ProjectSnapshot, env: &EnvSnapshot) -> Result<Self> {
        let tool = &project.tool;
        let venv_location = match env.var(LOCATION_ENV).or(tool.location.as_deref()) {
            Some(raw) => expand_location(&project.root, raw)?,
            None => default_venv_location()?,
        };
        let backend = match env.var(BACKEND_ENV).or(tool.backend.as_deref()) {
            Some(name) => parse_backend(name)?,
            None => BackendKind::default(),
        };
        Ok(Self {
            root: project.root.clone(),
            venv_location,
            prefix: tool
                .prefix
                .clone()
                .unwrap_or_else(|| venv_prefix(&project.root)),
            backend,
            in_project: env
                .switch(IN_PROJECT_ENV)
                .or(tool.in_project)
                .unwrap_or(false),
            python: tool.python.clone(),
        })
    }

    #[must_use]
    pub fn in_project_location(&self) -> PathBuf {
        self.root.join(IN_PROJECT_DIR)
    }
}

fn parse_backend(name: &str) -> Result<BackendKind> {
    BackendKind::from_str(name.trim()).map_err(|_| {
        let known = BackendKind::all()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("unknown venv backend `{name}` (expected one of: {known})")
    })
}

fn expand_location(root: &Path, raw: &str) -> Result<PathBuf> {
    let path = if let Some(rest) = raw.strip_prefix("~/") {
        dirs_next::home_dir()
            .ok_or_else(|| anyhow!("home directory not found while expanding `{raw}`"))?
            .join(rest)
    } else {
        PathBuf::from(raw)
    };
    Ok(if path.is_absolute() {
        path
    } else {
        root.join(path)
    })
}

fn default_venv_location() -> Result<PathBuf> {
    let cache = dirs_next::cache_dir()
        .ok_or_else(|| anyhow!("user cache directory not found; set {LOCATION_ENV}"))?;
    Ok(cache.join("venvx").join("venvs"))
}
