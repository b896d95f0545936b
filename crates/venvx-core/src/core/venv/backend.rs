use std::fs;
use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;
use tracing::{debug, warn};

use super::errors::VenvError;
use super::invoke::run_creation_command;
use super::strategy::BackendKind;
use crate::core::python::PythonInfo;
use crate::effects::Effects;
use crate::settings::ProjectConfig;

/// Arguments to [`Backend::create`].
#[derive(Clone, Debug, Default)]
pub struct CreateOptions {
    /// Explicit environment name; the backend ident is used when absent.
    pub name: Option<String>,
    /// Raw arguments appended to the strategy's command line.
    pub args: Vec<String>,
    /// Delete an existing target instead of refusing.
    pub force: bool,
    /// Create `<project root>/.venv` instead of a named environment.
    pub in_project: bool,
}

/// Orchestrates one environment creation for a single strategy.
///
/// The target interpreter is resolved lazily and at most once per backend.
pub struct Backend<'a> {
    kind: BackendKind,
    project: &'a ProjectConfig,
    effects: &'a dyn Effects,
    python: Option<String>,
    resolved: OnceCell<PythonInfo>,
}

impl<'a> Backend<'a> {
    #[must_use]
    pub fn new(
        kind: BackendKind,
        project: &'a ProjectConfig,
        effects: &'a dyn Effects,
        python: Option<String>,
    ) -> Self {
        Self {
            kind,
            project,
            effects,
            python: python.filter(|hint| !hint.trim().is_empty()),
            resolved: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn python_hint(&self) -> Option<&str> {
        self.python.as_deref()
    }

    /// The interpreter this backend provisions from.
    ///
    /// # Errors
    /// Returns [`VenvError::InterpreterNotFound`] when the hint (or the
    /// project's configured interpreter) matches nothing.
    pub fn resolved_interpreter(&self) -> Result<&PythonInfo, VenvError> {
        self.resolved.get_or_try_init(|| self.resolve_interpreter())
    }

    /// The interpreter if an earlier step already resolved it. Never
    /// triggers a lookup.
    #[must_use]
    pub fn resolved(&self) -> Option<&PythonInfo> {
        self.resolved.get()
    }

    fn resolve_interpreter(&self) -> Result<PythonInfo, VenvError> {
        let finder = self.effects.python();
        let Some(hint) = self.python.as_deref().or(self.project.python.as_deref()) else {
            debug!("using the default interpreter");
            return finder.default_interpreter();
        };
        let info = finder
            .find(hint)?
            .into_iter()
            .next()
            .ok_or_else(|| VenvError::InterpreterNotFound {
                hint: hint.to_string(),
            })?;
        debug!(hint, identifier = %info.identifier(), "resolved interpreter");
        Ok(info)
    }

    pub(crate) fn driver_interpreter(&self) -> Result<PathBuf, VenvError> {
        self.effects.python().driver_interpreter()
    }

    /// Identity string used to name the default location. Conda accepts
    /// interpreter specs that need not exist locally, so its ident is the raw
    /// hint when one was given.
    ///
    /// # Errors
    /// Propagates interpreter resolution failures.
    pub fn ident(&self) -> Result<String, VenvError> {
        match (self.kind, self.python.as_deref()) {
            (BackendKind::Conda, Some(hint)) => Ok(hint.to_string()),
            _ => Ok(self.resolved_interpreter()?.identifier()),
        }
    }

    /// `<venv location>/<prefix><name or ident>`, creating the parent
    /// directory when missing.
    ///
    /// # Errors
    /// Returns an error when the parent cannot be created or the ident cannot
    /// be computed.
    pub fn compute_location(&self, name: Option<&str>) -> Result<PathBuf, VenvError> {
        let parent = &self.project.venv_location;
        if !parent.is_dir() {
            fs::create_dir_all(parent)
                .map_err(|err| VenvError::io("creating venv location", parent, err))?;
        }
        let suffix = match name {
            Some(name) => name.to_string(),
            None => self.ident()?,
        };
        Ok(parent.join(format!("{}{suffix}", self.project.prefix)))
    }

    /// Refuses to touch an existing `location` unless `force` is set, in
    /// which case it is deleted outright.
    ///
    /// # Errors
    /// Returns [`VenvError::LocationNotEmpty`] when the location exists and
    /// `force` is false.
    pub fn ensure_clean(&self, location: &Path, force: bool) -> Result<(), VenvError> {
        let Ok(metadata) = fs::symlink_metadata(location) else {
            return Ok(());
        };
        if !force {
            return Err(VenvError::LocationNotEmpty {
                location: location.to_path_buf(),
            });
        }
        warn!("Cleaning existing target directory {}", location.display());
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(location)
        } else {
            fs::remove_file(location)
        };
        removed.map_err(|err| VenvError::io("removing", location, err))
    }

    /// Creates the environment and returns where it lives.
    ///
    /// The command line is assembled before anything is deleted, so argument
    /// conflicts and resolution failures leave an existing target intact.
    /// After a forced cleanup a failing tool leaves the location absent.
    ///
    /// # Errors
    /// Any [`VenvError`]; none are retried.
    pub fn create(&self, options: &CreateOptions) -> Result<PathBuf, VenvError> {
        let location = if options.in_project {
            self.project.in_project_location()
        } else {
            self.compute_location(options.name.as_deref())?
        };
        let command = self.kind.command(self, &location, &options.args)?;
        self.ensure_clean(&location, options.force)?;
        run_creation_command(self.effects.process(), &command, &self.project.root)?;
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::venv::testing::{cpython, FakeEffects, FakeFinder, RecordingRunner};
    use tempfile::{tempdir, TempDir};

    fn project(temp: &TempDir) -> ProjectConfig {
        let root = temp.path().join("project");
        fs::create_dir_all(&root).expect("project root");
        ProjectConfig {
            root,
            venv_location: temp.path().join("envs"),
            prefix: "proj-".into(),
            backend: BackendKind::Virtualenv,
            in_project: false,
            python: None,
        }
    }

    fn effects(runner: RecordingRunner) -> FakeEffects {
        FakeEffects {
            finder: FakeFinder::new(cpython("/usr/bin/python3.12", 3, 12, 1))
                .with("3.9", cpython("/usr/bin/python3.9", 3, 9, 7)),
            runner,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn venv_create_uses_target_interpreter_and_named_location() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let effects = effects(RecordingRunner::succeeding());
        let backend = Backend::new(BackendKind::Venv, &config, &effects, Some("3.9".into()));

        let location = backend
            .create(&CreateOptions::default())
            .expect("create");

        let expected = temp.path().join("envs").join("proj-cpython-3.9.7");
        assert_eq!(location, expected);
        assert!(temp.path().join("envs").is_dir(), "parent is created");
        assert_eq!(
            effects.runner.calls(),
            vec![strings(&[
                "/usr/bin/python3.9",
                "-m",
                "venv",
                expected.to_str().expect("utf8"),
            ])]
        );
    }

    #[test]
    fn virtualenv_runs_under_the_driver_and_pins_the_target() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let effects = effects(RecordingRunner::succeeding());
        let backend =
            Backend::new(BackendKind::Virtualenv, &config, &effects, Some("3.9".into()));
        let options = CreateOptions {
            name: Some("dev".into()),
            args: strings(&["--system-site-packages"]),
            ..CreateOptions::default()
        };

        let location = backend.create(&options).expect("create");

        assert_eq!(location, temp.path().join("envs").join("proj-dev"));
        let driver = effects.finder.driver().to_str().expect("utf8").to_string();
        assert_eq!(
            effects.runner.calls(),
            vec![vec![
                driver,
                "-m".into(),
                "virtualenv".into(),
                location.to_str().expect("utf8").into(),
                "-p".into(),
                "/usr/bin/python3.9".into(),
                "--system-site-packages".into(),
            ]]
        );
    }

    #[test]
    fn existing_location_without_force_is_left_untouched() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let location = temp.path().join("envs").join("proj-keep");
        fs::create_dir_all(&location).expect("existing env");
        fs::write(location.join("marker"), "keep").expect("marker");
        for kind in BackendKind::all() {
            let effects = effects(RecordingRunner::succeeding());
            let backend = Backend::new(*kind, &config, &effects, Some("3.9".into()));
            let options = CreateOptions {
                name: Some("keep".into()),
                ..CreateOptions::default()
            };

            let err = backend.create(&options).expect_err("must refuse");

            assert!(
                matches!(err, VenvError::LocationNotEmpty { ref location } if location.ends_with("proj-keep")),
                "{kind}: {err}"
            );
            assert!(effects.runner.calls().is_empty(), "{kind}: nothing runs");
            assert_eq!(
                fs::read_to_string(location.join("marker")).expect("marker"),
                "keep"
            );
        }
    }

    #[test]
    fn forced_creation_deletes_before_running_the_tool() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        for kind in BackendKind::all() {
            let location = temp.path().join("envs").join("proj-old");
            fs::create_dir_all(location.join("lib")).expect("existing env");
            fs::write(location.join("lib").join("stale.py"), "").expect("stale file");
            let effects = effects(RecordingRunner::succeeding().watching(&location));
            let backend = Backend::new(*kind, &config, &effects, Some("3.9".into()));
            let options = CreateOptions {
                name: Some("old".into()),
                force: true,
                ..CreateOptions::default()
            };

            backend.create(&options).expect("forced create");

            assert_eq!(effects.runner.watched_existed(), vec![false], "{kind}");
        }
    }

    #[test]
    fn failed_forced_recreation_leaves_location_absent() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let location = temp.path().join("envs").join("proj-broken");
        fs::create_dir_all(&location).expect("existing env");
        let effects = effects(RecordingRunner::exiting_with(1).watching(&location));
        let backend = Backend::new(BackendKind::Venv, &config, &effects, Some("3.9".into()));
        let options = CreateOptions {
            name: Some("broken".into()),
            force: true,
            ..CreateOptions::default()
        };

        let err = backend.create(&options).expect_err("tool fails");

        assert!(matches!(err, VenvError::CreationFailed { .. }), "{err}");
        assert!(!location.exists(), "old contents are not restored");
    }

    #[test]
    fn resolution_happens_once_per_backend() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let effects = effects(RecordingRunner::succeeding());
        let backend = Backend::new(BackendKind::Venv, &config, &effects, Some("3.9".into()));

        assert_eq!(backend.ident().expect("ident"), "cpython-3.9.7");
        assert_eq!(backend.ident().expect("ident"), "cpython-3.9.7");
        backend.create(&CreateOptions::default()).expect("create");

        assert_eq!(effects.finder.resolutions(), 1);
    }

    #[test]
    fn unknown_hint_is_interpreter_not_found() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let effects = effects(RecordingRunner::succeeding());
        let backend = Backend::new(BackendKind::Venv, &config, &effects, Some("2.7".into()));

        let err = backend
            .create(&CreateOptions::default())
            .expect_err("no 2.7");

        assert!(matches!(err, VenvError::InterpreterNotFound { ref hint } if hint == "2.7"));
        assert!(effects.runner.calls().is_empty());
    }

    #[test]
    fn no_hint_falls_back_to_project_then_default_interpreter() {
        let temp = tempdir().expect("tempdir");
        let mut config = project(&temp);
        let effects = effects(RecordingRunner::succeeding());

        let backend = Backend::new(BackendKind::Venv, &config, &effects, None);
        assert_eq!(backend.ident().expect("ident"), "cpython-3.12.1");

        config.python = Some("3.9".into());
        let backend = Backend::new(BackendKind::Venv, &config, &effects, None);
        assert_eq!(backend.ident().expect("ident"), "cpython-3.9.7");
    }

    #[test]
    fn conda_ident_is_the_raw_hint() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let effects = effects(RecordingRunner::succeeding());
        let backend = Backend::new(BackendKind::Conda, &config, &effects, Some("3.11".into()));

        assert_eq!(backend.ident().expect("ident"), "3.11");
        assert_eq!(effects.finder.resolutions(), 0);
    }

    #[test]
    fn conda_pins_the_hint_or_resolved_minor_version() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);

        let effects_hint = effects(RecordingRunner::succeeding());
        let backend =
            Backend::new(BackendKind::Conda, &config, &effects_hint, Some("3.11".into()));
        let location = backend
            .create(&CreateOptions {
                args: strings(&["-c", "conda-forge"]),
                ..CreateOptions::default()
            })
            .expect("create");
        assert_eq!(location, temp.path().join("envs").join("proj-3.11"));
        assert_eq!(
            effects_hint.runner.calls(),
            vec![strings(&[
                "conda",
                "create",
                "--yes",
                "--prefix",
                location.to_str().expect("utf8"),
                "pip",
                "python=3.11",
                "-c",
                "conda-forge",
            ])]
        );

        let effects_default = effects(RecordingRunner::succeeding());
        let backend = Backend::new(BackendKind::Conda, &config, &effects_default, None);
        backend.create(&CreateOptions::default()).expect("create");
        let calls = effects_default.runner.calls();
        assert!(calls[0].contains(&"python=3.12".to_string()), "{calls:?}");
    }

    #[test]
    fn conda_rejects_python_pin_in_extra_args_before_touching_anything() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let location = temp.path().join("envs").join("proj-3.10");
        fs::create_dir_all(&location).expect("existing env");
        let effects = effects(RecordingRunner::succeeding());
        let backend = Backend::new(BackendKind::Conda, &config, &effects, Some("3.10".into()));

        let err = backend
            .create(&CreateOptions {
                args: strings(&["numpy", "python=3.8"]),
                force: true,
                ..CreateOptions::default()
            })
            .expect_err("python= conflicts");

        assert!(matches!(err, VenvError::Usage { .. }), "{err}");
        assert!(effects.runner.calls().is_empty());
        assert!(location.exists(), "usage errors do not delete");
    }

    #[test]
    fn in_project_creates_dot_venv_under_root() {
        let temp = tempdir().expect("tempdir");
        let config = project(&temp);
        let effects = effects(RecordingRunner::succeeding());
        let backend = Backend::new(BackendKind::Venv, &config, &effects, Some("3.9".into()));

        let location = backend
            .create(&CreateOptions {
                name: Some("ignored".into()),
                in_project: true,
                ..CreateOptions::default()
            })
            .expect("create");

        assert_eq!(location, config.root.join(".venv"));
        assert!(!temp.path().join("envs").exists(), "parent untouched");
    }
}
