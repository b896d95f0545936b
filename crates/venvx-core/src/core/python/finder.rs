use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use pep440_rs::Version;
use serde::{Deserialize, Serialize};
use tracing::debug;
use which::which;

use super::python_sys::{
    detect_interpreter, inspect_python, version_candidates, DEFAULT_PYTHON_ENV, DRIVER_PYTHON_ENV,
};
use crate::core::venv::VenvError;
use crate::effects::ProcessRunner;

/// A concrete interpreter chosen for a creation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonInfo {
    pub executable: PathBuf,
    pub implementation: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl PythonInfo {
    /// Stable name for this interpreter, e.g. `cpython-3.9.7`.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!(
            "{}-{}.{}.{}",
            self.implementation, self.major, self.minor, self.patch
        )
    }

    /// `<major>.<minor>`, the form package managers pin against.
    #[must_use]
    pub fn short_version(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    #[must_use]
    pub fn executable_str(&self) -> String {
        self.executable.to_string_lossy().into_owned()
    }

    /// True when every component of `release` agrees with this interpreter.
    #[must_use]
    pub fn matches_release(&self, release: &[u64]) -> bool {
        release
            .iter()
            .zip([self.major, self.minor, self.patch])
            .all(|(want, have)| *want == have)
    }
}

/// Narrow interface the backends use to turn hints into interpreters.
pub trait InterpreterFinder: Send + Sync {
    /// Candidates matching `hint`, best first. An empty list means nothing
    /// matched.
    fn find(&self, hint: &str) -> Result<Vec<PythonInfo>, VenvError>;
    fn default_interpreter(&self) -> Result<PythonInfo, VenvError>;
    /// The Python that runs third-party tooling such as `virtualenv`.
    fn driver_interpreter(&self) -> Result<PathBuf, VenvError>;
}

/// Finds interpreters on the host. Probes go through `runner`.
#[derive(Clone)]
pub struct SystemInterpreterFinder {
    default_python: Option<String>,
    driver_python: Option<String>,
    runner: Arc<dyn ProcessRunner>,
}

impl SystemInterpreterFinder {
    #[must_use]
    pub fn new(
        default_python: Option<String>,
        driver_python: Option<String>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            default_python,
            driver_python,
            runner,
        }
    }

    #[must_use]
    pub fn from_env(runner: Arc<dyn ProcessRunner>) -> Self {
        Self::new(
            env::var(DEFAULT_PYTHON_ENV).ok(),
            env::var(DRIVER_PYTHON_ENV).ok(),
            runner,
        )
    }

    fn inspect(&self, path: &Path) -> Result<PythonInfo, VenvError> {
        inspect_python(self.runner.as_ref(), path).map_err(|err| VenvError::Probe {
            python: path.to_path_buf(),
            message: format!("{err:#}"),
        })
    }

    fn find_by_release(&self, release: &[u64]) -> Vec<PythonInfo> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for name in version_candidates(release) {
            let Ok(path) = which(&name) else {
                continue;
            };
            let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if !seen.insert(key) {
                continue;
            }
            match inspect_python(self.runner.as_ref(), &path) {
                Ok(info) if info.matches_release(release) => found.push(info),
                Ok(info) => debug!(
                    candidate = %path.display(),
                    identifier = %info.identifier(),
                    "interpreter version does not match"
                ),
                Err(err) => debug!(candidate = %path.display(), %err, "skipping interpreter"),
            }
        }
        found
    }
}

/// Parses hints like `3`, `3.9` or `3.9.1` into release components.
pub(crate) fn requested_release(hint: &str) -> Option<Vec<u64>> {
    let version = Version::from_str(hint.trim()).ok()?;
    let release = version.release();
    (1..=3).contains(&release.len()).then(|| release.to_vec())
}

impl InterpreterFinder for SystemInterpreterFinder {
    fn find(&self, hint: &str) -> Result<Vec<PythonInfo>, VenvError> {
        let as_path = Path::new(hint);
        if as_path.is_file() {
            debug!(hint, "resolving interpreter by path");
            return Ok(vec![self.inspect(as_path)?]);
        }
        if let Some(release) = requested_release(hint) {
            debug!(hint, "resolving interpreter by version");
            return Ok(self.find_by_release(&release));
        }
        debug!(hint, "resolving interpreter by executable name");
        match which(hint) {
            Ok(path) => Ok(vec![self.inspect(&path)?]),
            Err(_) => Ok(Vec::new()),
        }
    }

    fn default_interpreter(&self) -> Result<PythonInfo, VenvError> {
        let path = detect_interpreter(self.default_python.as_deref()).map_err(|err| {
            VenvError::InterpreterNotFound {
                hint: format!("default interpreter ({err})"),
            }
        })?;
        self.inspect(&path)
    }

    fn driver_interpreter(&self) -> Result<PathBuf, VenvError> {
        detect_interpreter(self.driver_python.as_deref()).map_err(|err| {
            VenvError::InterpreterNotFound {
                hint: format!("driver interpreter ({err})"),
            }
        })
    }
}
