use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use toml_edit::{DocumentMut, Item, Table};

pub const PYPROJECT_FILE: &str = "pyproject.toml";
pub const IN_PROJECT_DIR: &str = ".venv";

/// Raw values from `[tool.venvx]`; every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolSettings {
    pub location: Option<String>,
    pub prefix: Option<String>,
    pub backend: Option<String>,
    pub in_project: Option<bool>,
    pub python: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ProjectSnapshot {
    pub root: PathBuf,
    pub tool: ToolSettings,
}

impl ProjectSnapshot {
    pub fn read_current() -> Result<Self> {
        let root = current_project_root()?;
        Self::read_from(&root)
    }

    /// Reads the project rooted at `root`. A missing `pyproject.toml` is not an
    /// error; the project then runs on defaults.
    pub fn read_from(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let manifest_path = root.join(PYPROJECT_FILE);
        if !manifest_path.is_file() {
            return Ok(Self {
                root: root.to_path_buf(),
                tool: ToolSettings::default(),
            });
        }
        let contents = fs::read_to_string(&manifest_path)
            .with_context(|| format!("reading {}", manifest_path.display()))?;
        let doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;
        let tool = match tool_table(&doc) {
            Some(table) => read_tool_settings(table)
                .with_context(|| format!("invalid [tool.venvx] in {}", manifest_path.display()))?,
            None => ToolSettings::default(),
        };
        Ok(Self {
            root: root.to_path_buf(),
            tool,
        })
    }
}

fn tool_table(doc: &DocumentMut) -> Option<&Table> {
    doc.get("tool")
        .and_then(Item::as_table)
        .and_then(|tool| tool.get("venvx"))
        .and_then(Item::as_table)
}

fn read_tool_settings(table: &Table) -> Result<ToolSettings> {
    let in_project = match table.get("in-project") {
        None => None,
        Some(item) => Some(
            item.as_bool()
                .ok_or_else(|| anyhow!("`in-project` must be a boolean"))?,
        ),
    };
    Ok(ToolSettings {
        location: string_key(table, "location")?,
        prefix: string_key(table, "prefix")?,
        backend: string_key(table, "backend")?,
        in_project,
        python: string_key(table, "python")?,
    })
}

fn string_key(table: &Table, key: &str) -> Result<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(item) => match item.as_str() {
            Some(value) => Ok(Some(value.to_string())),
            None => bail!("`{key}` must be a string"),
        },
    }
}

/// Returns the nearest project root, falling back to the working directory.
pub fn current_project_root() -> Result<PathBuf> {
    let cwd = env::current_dir().context("unable to determine project root")?;
    Ok(discover_project_root(&cwd).unwrap_or(cwd))
}

/// Walks up from `start` looking for a directory with a `pyproject.toml`.
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(PYPROJECT_FILE).is_file() {
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}
