//! Virtualenv creation backends, the venv inventory, and their command handlers.

mod backend;
mod commands;
mod errors;
mod inventory;
mod invoke;
mod strategy;
#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Backend, CreateOptions};
pub use commands::{
    venv_create, venv_list, venv_python, venv_remove, VenvCreateRequest, VenvListRequest,
    VenvPythonRequest, VenvRemoveRequest,
};
pub use errors::{ProcessFailure, VenvError};
pub use inventory::{
    find_venv, list_venvs, remove_venv, venv_python_path, VenvEntry, IN_PROJECT_KEY,
};
pub use strategy::BackendKind;
