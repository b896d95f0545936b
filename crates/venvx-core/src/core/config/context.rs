use std::fmt;
use std::sync::OnceLock;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use venvx_domain::ProjectSnapshot;

use crate::effects::{Effects, SharedEffects};
use crate::settings::{EnvSnapshot, GlobalOptions, ProjectConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandGroup {
    Create,
    List,
    Remove,
    Python,
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandGroup::Create => "create",
            CommandGroup::List => "list",
            CommandGroup::Remove => "remove",
            CommandGroup::Python => "python",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    env: EnvSnapshot,
    project: OnceLock<ProjectConfig>,
    effects: SharedEffects,
}

impl<'a> CommandContext<'a> {
    #[must_use]
    pub fn new(global: &'a GlobalOptions, effects: SharedEffects) -> Self {
        Self {
            global,
            env: EnvSnapshot::capture(),
            project: OnceLock::new(),
            effects,
        }
    }

    /// Context with a pre-resolved project, bypassing discovery.
    #[must_use]
    pub fn with_project(
        global: &'a GlobalOptions,
        effects: SharedEffects,
        project: ProjectConfig,
    ) -> Self {
        let ctx = Self::new(global, effects);
        let _ = ctx.project.set(project);
        ctx
    }

    pub fn effects(&self) -> &dyn Effects {
        self.effects.as_ref()
    }

    /// Loads the current project's configuration on first use.
    ///
    /// # Errors
    /// Returns an error if the manifest cannot be read or holds invalid
    /// settings.
    pub fn project(&self) -> Result<&ProjectConfig> {
        if let Some(project) = self.project.get() {
            return Ok(project);
        }
        let snapshot = ProjectSnapshot::read_current()?;
        let config = ProjectConfig::from_snapshot(&snapshot, &self.env)?;
        Ok(self.project.get_or_init(|| config))
    }
}
