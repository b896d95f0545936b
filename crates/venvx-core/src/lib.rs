#![deny(clippy::all, warnings)]

mod core;

pub(crate) use crate::core::config::{context, settings};
pub(crate) use crate::core::runtime::effects;
#[cfg(test)]
pub(crate) use crate::core::runtime::process;
pub(crate) use crate::core::tooling::outcome;

pub use crate::core::config::context::{CommandContext, CommandGroup, CommandInfo};
pub use crate::core::config::{EnvSnapshot, GlobalOptions, ProjectConfig};
pub use crate::core::python::{InterpreterFinder, PythonInfo, SystemInterpreterFinder};
pub use crate::core::runtime::effects::{Effects, ProcessRunner, SharedEffects, SystemEffects};
pub use crate::core::runtime::process::RunOutput;
pub use crate::core::tooling::outcome::{
    format_status_message, to_json_response, CommandStatus, ExecutionOutcome,
};
pub use crate::core::venv::{
    find_venv, list_venvs, remove_venv, venv_create, venv_list, venv_python, venv_python_path,
    venv_remove, Backend, BackendKind, CreateOptions, ProcessFailure, VenvCreateRequest,
    VenvEntry, VenvError, VenvListRequest, VenvPythonRequest, VenvRemoveRequest,
    IN_PROJECT_KEY,
};
