use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::backend::Backend;
use super::errors::VenvError;

const CONDA_PROGRAM: &str = "conda";

/// The closed set of creation strategies, keyed by the name users pass to
/// `--with` or `[tool.venvx] backend`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `<driver> -m virtualenv <location> -p <target>`
    #[default]
    Virtualenv,
    /// `<target> -m venv <location>`
    Venv,
    /// `conda create --yes --prefix <location> pip python=<version>`
    Conda,
}

impl BackendKind {
    #[must_use]
    pub const fn all() -> &'static [BackendKind] {
        &[Self::Virtualenv, Self::Venv, Self::Conda]
    }

    /// Builds the full command line that creates an environment at
    /// `location`. `args` are appended verbatim after the strategy's own
    /// arguments.
    pub(crate) fn command(
        self,
        backend: &Backend<'_>,
        location: &Path,
        args: &[String],
    ) -> Result<Vec<String>, VenvError> {
        let location = location.to_string_lossy().into_owned();
        let mut cmd = match self {
            Self::Virtualenv => {
                let driver = backend.driver_interpreter()?;
                let target = backend.resolved_interpreter()?;
                vec![
                    driver.to_string_lossy().into_owned(),
                    "-m".into(),
                    "virtualenv".into(),
                    location,
                    "-p".into(),
                    target.executable_str(),
                ]
            }
            Self::Venv => {
                let target = backend.resolved_interpreter()?;
                vec![target.executable_str(), "-m".into(), "venv".into(), location]
            }
            Self::Conda => {
                if args.iter().any(|arg| arg.starts_with("python=")) {
                    return Err(VenvError::Usage {
                        message: "Cannot use python= in conda creation arguments".into(),
                    });
                }
                let version = match backend.python_hint() {
                    Some(hint) => hint.to_string(),
                    None => backend.resolved_interpreter()?.short_version(),
                };
                vec![
                    CONDA_PROGRAM.into(),
                    "create".into(),
                    "--yes".into(),
                    "--prefix".into(),
                    location,
                    "pip".into(),
                    format!("python={version}"),
                ]
            }
        };
        cmd.extend(args.iter().cloned());
        Ok(cmd)
    }
}
