//! In-memory effects for exercising backends without spawning processes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use crate::core::python::{InterpreterFinder, PythonInfo};
use crate::core::venv::VenvError;
use crate::effects::{Effects, ProcessRunner};
use crate::process::RunOutput;

pub(crate) fn cpython(executable: &str, major: u64, minor: u64, patch: u64) -> PythonInfo {
    PythonInfo {
        executable: PathBuf::from(executable),
        implementation: "cpython".into(),
        major,
        minor,
        patch,
    }
}

pub(crate) struct FakeFinder {
    candidates: HashMap<String, Vec<PythonInfo>>,
    default: PythonInfo,
    driver: PathBuf,
    find_calls: AtomicUsize,
    default_calls: AtomicUsize,
}

impl FakeFinder {
    pub(crate) fn new(default: PythonInfo) -> Self {
        Self {
            candidates: HashMap::new(),
            default,
            driver: PathBuf::from("/host/bin/python3"),
            find_calls: AtomicUsize::new(0),
            default_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with(mut self, hint: &str, info: PythonInfo) -> Self {
        self.candidates.entry(hint.to_string()).or_default().push(info);
        self
    }

    pub(crate) fn resolutions(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst) + self.default_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn driver(&self) -> &Path {
        &self.driver
    }
}

impl InterpreterFinder for FakeFinder {
    fn find(&self, hint: &str) -> Result<Vec<PythonInfo>, VenvError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.get(hint).cloned().unwrap_or_default())
    }

    fn default_interpreter(&self) -> Result<PythonInfo, VenvError> {
        self.default_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.default.clone())
    }

    fn driver_interpreter(&self) -> Result<PathBuf, VenvError> {
        Ok(self.driver.clone())
    }
}

enum RunnerMode {
    Exit(i32),
    SpawnError,
}

/// Records every command instead of running it. When `watch` is set, also
/// records whether that path existed at the moment each command ran.
pub(crate) struct RecordingRunner {
    mode: RunnerMode,
    watch: Option<PathBuf>,
    materialize: bool,
    stdout: String,
    calls: Mutex<Vec<Vec<String>>>,
    watched_existed: Mutex<Vec<bool>>,
}

impl RecordingRunner {
    pub(crate) fn succeeding() -> Self {
        Self::exiting_with(0)
    }

    pub(crate) fn exiting_with(code: i32) -> Self {
        Self {
            mode: RunnerMode::Exit(code),
            watch: None,
            materialize: false,
            stdout: String::new(),
            calls: Mutex::new(Vec::new()),
            watched_existed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_to_spawn() -> Self {
        Self {
            mode: RunnerMode::SpawnError,
            ..Self::succeeding()
        }
    }

    pub(crate) fn watching(mut self, path: &Path) -> Self {
        self.watch = Some(path.to_path_buf());
        self
    }

    /// Creates the watched path with a `bin/python` stub on success, like a
    /// real creation tool would.
    pub(crate) fn materializing(mut self) -> Self {
        self.materialize = true;
        self
    }

    /// Output returned by every call, such as an interpreter probe payload.
    pub(crate) fn printing(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn watched_existed(&self) -> Vec<bool> {
        self.watched_existed.lock().expect("watch lock").clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run_command(&self, program: &str, args: &[String], cwd: &Path) -> Result<RunOutput> {
        self.run_command_passthrough(program, args, cwd)
    }

    fn run_command_passthrough(
        &self,
        program: &str,
        args: &[String],
        _cwd: &Path,
    ) -> Result<RunOutput> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        self.calls.lock().expect("calls lock").push(call);
        if let Some(watch) = &self.watch {
            self.watched_existed
                .lock()
                .expect("watch lock")
                .push(watch.exists());
        }
        let code = match self.mode {
            RunnerMode::Exit(code) => code,
            RunnerMode::SpawnError => return Err(anyhow!("failed to start {program}")),
        };
        if code == 0 && self.materialize {
            if let Some(watch) = &self.watch {
                let bin = watch.join(if cfg!(windows) { "Scripts" } else { "bin" });
                std::fs::create_dir_all(&bin)?;
                std::fs::write(bin.join(if cfg!(windows) { "python.exe" } else { "python" }), "")?;
            }
        }
        Ok(RunOutput {
            code,
            stdout: self.stdout.clone(),
            stderr: String::new(),
        })
    }
}

pub(crate) struct FakeEffects {
    pub(crate) finder: FakeFinder,
    pub(crate) runner: RecordingRunner,
}

impl Effects for FakeEffects {
    fn python(&self) -> &dyn InterpreterFinder {
        &self.finder
    }

    fn process(&self) -> &dyn ProcessRunner {
        &self.runner
    }
}
