use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use super::process::{run_command, run_command_passthrough, RunOutput};
use crate::core::python::{InterpreterFinder, SystemInterpreterFinder};

/// Spawns external programs on behalf of the backends.
pub trait ProcessRunner: Send + Sync {
    fn run_command(&self, program: &str, args: &[String], cwd: &Path) -> Result<RunOutput>;
    fn run_command_passthrough(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<RunOutput>;
}

pub trait Effects: Send + Sync {
    fn python(&self) -> &dyn InterpreterFinder;
    fn process(&self) -> &dyn ProcessRunner;
}

pub type SharedEffects = Arc<dyn Effects>;

pub struct SystemEffects {
    python: Arc<SystemInterpreterFinder>,
    process: Arc<SystemProcessRunner>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        let process = Arc::new(SystemProcessRunner);
        Self {
            python: Arc::new(SystemInterpreterFinder::from_env(process.clone())),
            process,
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn python(&self) -> &dyn InterpreterFinder {
        self.python.as_ref()
    }

    fn process(&self) -> &dyn ProcessRunner {
        self.process.as_ref()
    }
}

pub(crate) struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run_command(&self, program: &str, args: &[String], cwd: &Path) -> Result<RunOutput> {
        run_command(program, args, cwd)
    }

    fn run_command_passthrough(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<RunOutput> {
        run_command_passthrough(program, args, cwd)
    }
}
