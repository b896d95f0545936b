#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::assert::Assert;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway project with `[tool.venvx]` pointing its venvs into the same
/// temp dir. Returns (guard, project root, venv location).
pub fn prepare_project(prefix: &str) -> (TempDir, PathBuf, PathBuf) {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("tempdir");
    let root = temp.path().join("sample");
    let envs = temp.path().join("envs");
    fs::create_dir_all(&root).expect("project root");
    fs::write(
        root.join("pyproject.toml"),
        format!(
            "[project]\nname = \"sample\"\n\n[tool.venvx]\nlocation = \"{}\"\nprefix = \"sample-\"\n",
            envs.display().to_string().replace('\\', "/")
        ),
    )
    .expect("pyproject");
    (temp, root, envs)
}

pub fn parse_json(assert: &Assert) -> Value {
    serde_json::from_slice(&assert.get_output().stdout).expect("valid json")
}

/// Writes a shell script that answers the interpreter probe as CPython 3.9.7
/// and fakes `-m venv <location>` by creating `bin/python` there.
#[cfg(unix)]
pub fn fake_python(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-python");
    fs::write(
        &script,
        r#"#!/bin/sh
if [ "$1" = "-c" ]; then
  echo '{"implementation": "cpython", "version": [3, 9, 7]}'
  exit 0
fi
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin" && : > "$3/bin/python"
  exit 0
fi
exit 9
"#,
    )
    .expect("fake python");
    let mut perms = fs::metadata(&script).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).expect("chmod");
    script
}
