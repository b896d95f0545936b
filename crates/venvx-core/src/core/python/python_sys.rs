use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::from_str;
use which::which;

use super::PythonInfo;
use crate::effects::ProcessRunner;

pub(crate) const DEFAULT_PYTHON_ENV: &str = "VENVX_PYTHON";
pub(crate) const DRIVER_PYTHON_ENV: &str = "VENVX_DRIVER_PYTHON";

const HOST_CANDIDATES: [&str; 2] = ["python3", "python"];

const PROBE_SCRIPT: &str = r#"import json, sys
print(json.dumps({
    "implementation": getattr(sys.implementation, "name", "cpython"),
    "version": list(sys.version_info[:3]),
}))
"#;

#[derive(Deserialize)]
struct ProbePayload {
    implementation: String,
    version: Vec<u64>,
}

/// Detects the host's default Python, honoring an explicit override first.
///
/// # Errors
///
/// Returns an error when no interpreter is on `PATH` or the path is not valid
/// UTF-8.
pub fn detect_interpreter(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(explicit) = explicit {
        return Ok(PathBuf::from(explicit));
    }
    for candidate in HOST_CANDIDATES {
        if let Ok(path) = which(candidate) {
            return Ok(path);
        }
    }
    bail!("no python interpreter found; set {DEFAULT_PYTHON_ENV}")
}

/// Runs the probe script through `python` with `runner` and builds its
/// descriptor. The
/// descriptor keeps the path it was invoked through rather than
/// `sys.executable`, so symlinked interpreters report the name the user gave.
///
/// # Errors
///
/// Returns an error when the interpreter cannot be executed or prints a
/// malformed payload.
pub fn inspect_python(runner: &dyn ProcessRunner, python: &Path) -> Result<PythonInfo> {
    let program = python
        .to_str()
        .ok_or_else(|| anyhow!("non-utf8 path {}", python.display()))?;
    let output = runner
        .run_command(
            program,
            &["-c".to_string(), PROBE_SCRIPT.to_string()],
            Path::new("."),
        )
        .with_context(|| format!("failed to probe interpreter via {program}"))?;
    if !output.success() {
        bail!("python probe failed: {}", output.stderr.trim());
    }
    let payload: ProbePayload =
        from_str(output.stdout.trim()).context("invalid interpreter probe payload")?;
    let &[major, minor, patch] = payload.version.as_slice() else {
        bail!("unexpected version payload {:?}", payload.version);
    };
    Ok(PythonInfo {
        executable: python.to_path_buf(),
        implementation: payload.implementation.to_ascii_lowercase(),
        major,
        minor,
        patch,
    })
}

/// Executable names worth probing for a requested `major[.minor[.patch]]`.
pub(crate) fn version_candidates(release: &[u64]) -> Vec<String> {
    let mut names = Vec::new();
    match release {
        [major, minor, ..] => {
            names.push(format!("python{major}.{minor}"));
            names.push(format!("python{major}"));
        }
        [major] => names.push(format!("python{major}")),
        [] => {}
    }
    for candidate in HOST_CANDIDATES {
        if !names.iter().any(|name| name == candidate) {
            names.push(candidate.to_string());
        }
    }
    names
}
