use anyhow::Result;
use serde_json::{json, Value};

use super::backend::{Backend, CreateOptions};
use super::errors::VenvError;
use super::inventory::{find_venv, list_venvs, remove_venv, venv_python_path, VenvEntry};
use super::strategy::BackendKind;
use crate::{CommandContext, ExecutionOutcome};

#[derive(Clone, Debug, Default)]
pub struct VenvCreateRequest {
    pub python: Option<String>,
    pub name: Option<String>,
    pub backend: Option<BackendKind>,
    pub force: bool,
    pub in_project: bool,
    pub args: Vec<String>,
}

pub struct VenvListRequest;

#[derive(Clone, Debug)]
pub struct VenvRemoveRequest {
    pub key: String,
    pub yes: bool,
}

#[derive(Clone, Debug)]
pub struct VenvPythonRequest {
    pub key: String,
}

fn config_error(err: &anyhow::Error) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        "unable to load project configuration",
        json!({
            "reason": "invalid_config",
            "error": format!("{err:#}"),
            "hint": "Check the [tool.venvx] table in pyproject.toml and VENVX_* variables.",
        }),
    )
}

fn entry_to_json(entry: &VenvEntry) -> Value {
    json!({
        "key": entry.key,
        "path": entry.path,
        "python": entry.python,
    })
}

/// Creates a virtualenv with the requested (or configured) backend.
///
/// # Errors
/// Never fails directly; problems are reported through the outcome.
pub fn venv_create(ctx: &CommandContext, request: &VenvCreateRequest) -> Result<ExecutionOutcome> {
    let project = match ctx.project() {
        Ok(project) => project,
        Err(err) => return Ok(config_error(&err)),
    };
    let kind = request.backend.unwrap_or(project.backend);
    let backend = Backend::new(kind, project, ctx.effects(), request.python.clone());
    let options = CreateOptions {
        name: request.name.clone(),
        args: request.args.clone(),
        force: request.force,
        in_project: request.in_project || (project.in_project && request.name.is_none()),
    };
    tracing::debug!(backend = %kind, ?options, "creating virtualenv");
    let location = match backend.create(&options) {
        Ok(location) => location,
        Err(err) => return Ok(err.into_outcome()),
    };
    let mut details = json!({
        "location": location,
        "backend": kind,
        "python": venv_python_path(&location),
    });
    if let Some(info) = backend.resolved() {
        details["interpreter"] = json!(info);
    }
    Ok(ExecutionOutcome::success(
        format!("virtualenv {} is created successfully", location.display()),
        details,
    ))
}

/// Lists the virtualenvs that belong to the current project.
///
/// # Errors
/// Never fails directly; problems are reported through the outcome.
pub fn venv_list(ctx: &CommandContext, _request: &VenvListRequest) -> Result<ExecutionOutcome> {
    let project = match ctx.project() {
        Ok(project) => project,
        Err(err) => return Ok(config_error(&err)),
    };
    let entries = match list_venvs(project) {
        Ok(entries) => entries,
        Err(err) => return Ok(err.into_outcome()),
    };
    let details = json!({
        "location": project.venv_location,
        "venvs": entries.iter().map(entry_to_json).collect::<Vec<_>>(),
    });
    if entries.is_empty() {
        return Ok(ExecutionOutcome::success(
            "no virtualenvs created for this project",
            details,
        ));
    }
    let summary = entries
        .iter()
        .map(|entry| format!("{}  {}", entry.key, entry.path.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(ExecutionOutcome::success(
        format!("virtualenvs:\n{summary}"),
        details,
    ))
}

/// Removes one of the project's virtualenvs. Requires explicit confirmation.
///
/// # Errors
/// Never fails directly; problems are reported through the outcome.
pub fn venv_remove(ctx: &CommandContext, request: &VenvRemoveRequest) -> Result<ExecutionOutcome> {
    let project = match ctx.project() {
        Ok(project) => project,
        Err(err) => return Ok(config_error(&err)),
    };
    if !request.yes {
        return Ok(match find_venv(project, &request.key) {
            Ok(Some(entry)) => ExecutionOutcome::user_error(
                format!("refusing to remove {} without --yes", entry.path.display()),
                json!({
                    "reason": "confirmation_required",
                    "path": entry.path,
                    "hint": format!("run `venvx remove {} --yes` to delete it", request.key),
                }),
            ),
            Ok(None) => VenvError::VenvNotFound {
                key: request.key.clone(),
            }
            .into_outcome(),
            Err(err) => err.into_outcome(),
        });
    }
    match remove_venv(project, &request.key) {
        Ok(entry) => Ok(ExecutionOutcome::success(
            format!("removed virtualenv {}", entry.path.display()),
            entry_to_json(&entry),
        )),
        Err(err) => Ok(err.into_outcome()),
    }
}

/// Reports the interpreter path inside one of the project's virtualenvs.
///
/// # Errors
/// Never fails directly; problems are reported through the outcome.
pub fn venv_python(ctx: &CommandContext, request: &VenvPythonRequest) -> Result<ExecutionOutcome> {
    let project = match ctx.project() {
        Ok(project) => project,
        Err(err) => return Ok(config_error(&err)),
    };
    let entry = match find_venv(project, &request.key) {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            return Ok(VenvError::VenvNotFound {
                key: request.key.clone(),
            }
            .into_outcome())
        }
        Err(err) => return Ok(err.into_outcome()),
    };
    let Some(python) = entry.python else {
        return Ok(ExecutionOutcome::user_error(
            format!("no interpreter found in {}", entry.path.display()),
            json!({
                "reason": "missing_interpreter",
                "path": entry.path,
                "hint": format!("recreate it with `venvx create --name {} --force`", request.key),
            }),
        ));
    };
    Ok(ExecutionOutcome::success(
        python.display().to_string(),
        json!({ "passthrough": true, "python": python }),
    ))
}
