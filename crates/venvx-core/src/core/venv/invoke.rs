use std::path::Path;

use tracing::debug;

use super::errors::{ProcessFailure, VenvError};
use crate::effects::ProcessRunner;

/// Renders a command line for logs and error messages, quoting arguments
/// that contain whitespace.
pub(crate) fn render_command(command: &[String]) -> String {
    command
        .iter()
        .map(|arg| {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                format!("\"{arg}\"")
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs `command` with inherited stdio. Anything but a zero exit is a
/// `CreationFailed`; partial output left on disk is not cleaned up here.
pub(crate) fn run_creation_command(
    runner: &dyn ProcessRunner,
    command: &[String],
    cwd: &Path,
) -> Result<(), VenvError> {
    let rendered = render_command(command);
    let Some((program, args)) = command.split_first() else {
        return Err(VenvError::Usage {
            message: "empty creation command".into(),
        });
    };
    debug!(command = %rendered, "run command");
    match runner.run_command_passthrough(program, args, cwd) {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => Err(VenvError::CreationFailed {
            command: rendered,
            source: ProcessFailure::Exit { code: output.code },
        }),
        Err(err) => Err(VenvError::CreationFailed {
            command: rendered,
            source: ProcessFailure::Spawn {
                message: format!("{err:#}"),
            },
        }),
    }
}
