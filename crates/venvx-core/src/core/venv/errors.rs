use std::io;
use std::path::PathBuf;

use serde_json::{json, Value};

use crate::outcome::ExecutionOutcome;

/// Why an external creation command did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ProcessFailure {
    #[error("exited with status {code}")]
    Exit { code: i32 },
    #[error("could not be started: {message}")]
    Spawn { message: String },
}

/// Every way a venv operation can fail. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum VenvError {
    #[error("[VX101] can't find python interpreter {hint}")]
    InterpreterNotFound { hint: String },
    #[error("[VX102] the location {} is not empty", .location.display())]
    LocationNotEmpty { location: PathBuf },
    #[error("[VX103] {message}")]
    Usage { message: String },
    #[error("[VX104] no virtualenv named '{key}'")]
    VenvNotFound { key: String },
    #[error("[VX110] command `{command}` {source}")]
    CreationFailed {
        command: String,
        #[source]
        source: ProcessFailure,
    },
    #[error("[VX111] unable to inspect python at {}: {message}", .python.display())]
    Probe { python: PathBuf, message: String },
    #[error("[VX120] {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VenvError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InterpreterNotFound { .. } => "VX101",
            Self::LocationNotEmpty { .. } => "VX102",
            Self::Usage { .. } => "VX103",
            Self::VenvNotFound { .. } => "VX104",
            Self::CreationFailed { .. } => "VX110",
            Self::Probe { .. } => "VX111",
            Self::Io { .. } => "VX120",
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InterpreterNotFound { .. } => "interpreter_not_found",
            Self::LocationNotEmpty { .. } => "location_not_empty",
            Self::Usage { .. } => "usage",
            Self::VenvNotFound { .. } => "venv_not_found",
            Self::CreationFailed { .. } => "creation_failed",
            Self::Probe { .. } => "interpreter_probe_failed",
            Self::Io { .. } => "io",
        }
    }

    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InterpreterNotFound { .. } => Some(
                "Pass a version like '3.11', an executable name, or a full interpreter path.",
            ),
            Self::LocationNotEmpty { .. } => {
                Some("Re-run with --force to replace it, or pick another --name.")
            }
            Self::Usage { .. } => Some("Drop python= from the extra arguments; venvx pins it."),
            Self::VenvNotFound { .. } => Some("Run `venvx list` to see available environments."),
            Self::CreationFailed { .. } => Some(
                "Check the tool output above; re-run with --force to clear a partial environment.",
            ),
            Self::Probe { .. } | Self::Io { .. } => None,
        }
    }

    /// Errors the operator can fix by changing their input.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InterpreterNotFound { .. }
                | Self::LocationNotEmpty { .. }
                | Self::Usage { .. }
                | Self::VenvNotFound { .. }
        )
    }

    #[must_use]
    pub fn details(&self) -> Value {
        let mut details = json!({
            "code": self.code(),
            "reason": self.reason(),
        });
        if let Value::Object(map) = &mut details {
            if let Some(hint) = self.hint() {
                map.insert("hint".into(), json!(hint));
            }
            match self {
                Self::InterpreterNotFound { hint } => {
                    map.insert("python".into(), json!(hint));
                }
                Self::LocationNotEmpty { location } => {
                    map.insert("location".into(), json!(location));
                }
                Self::Usage { .. } => {}
                Self::VenvNotFound { key } => {
                    map.insert("key".into(), json!(key));
                }
                Self::CreationFailed { command, source } => {
                    map.insert("command".into(), json!(command));
                    if let ProcessFailure::Exit { code } = source {
                        map.insert("exit_code".into(), json!(code));
                    }
                }
                Self::Probe { python, message } => {
                    map.insert("python".into(), json!(python));
                    map.insert("error".into(), json!(message));
                }
                Self::Io { path, source, .. } => {
                    map.insert("path".into(), json!(path));
                    map.insert("error".into(), json!(source.to_string()));
                }
            }
        }
        details
    }

    #[must_use]
    pub fn into_outcome(self) -> ExecutionOutcome {
        let details = self.details();
        if self.is_user_error() {
            ExecutionOutcome::user_error(self.to_string(), details)
        } else {
            ExecutionOutcome::failure(self.to_string(), details)
        }
    }
}
