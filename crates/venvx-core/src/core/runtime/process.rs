#![deny(clippy::all, warnings)]

use std::{
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Execute a program and capture stdout/stderr.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned or its output cannot
/// be collected.
pub fn run_command(program: &str, args: &[String], cwd: &Path) -> Result<RunOutput> {
    let mut command = configured_command(program, args, cwd);
    command.stdin(Stdio::null());
    let output = command
        .output()
        .with_context(|| format!("failed to start {program}"))?;
    Ok(RunOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Execute a program with inherited stdio so the child's output streams
/// straight to the terminal.
///
/// # Errors
///
/// Returns an error when the program cannot be spawned or waited on.
pub fn run_command_passthrough(program: &str, args: &[String], cwd: &Path) -> Result<RunOutput> {
    let mut command = configured_command(program, args, cwd);
    command.stdin(Stdio::inherit());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let status = command
        .status()
        .with_context(|| format!("failed to start {program}"))?;
    Ok(RunOutput {
        code: status.code().unwrap_or(-1),
        stdout: String::new(),
        stderr: String::new(),
    })
}

fn configured_command(program: &str, args: &[String], cwd: &Path) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    if cwd.is_dir() {
        command.current_dir(cwd);
    }
    command
}
