use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use venvx_core::BackendKind;

#[derive(Parser, Debug)]
#[command(
    name = "venvx",
    author,
    version,
    about = "Create and manage Python virtualenvs with virtualenv, venv, or conda",
    disable_help_subcommand = true
)]
pub struct VenvxCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)", global = true)]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Create a virtualenv for the current project.",
        override_usage = "venvx create [PYTHON] [--name NAME] [--with BACKEND] [--force] [--in-project] [-- ARGS...]"
    )]
    Create(CreateArgs),
    #[command(about = "List the virtualenvs created for the current project.")]
    List,
    #[command(about = "Remove a virtualenv by key (see `venvx list`).")]
    Remove(RemoveArgs),
    #[command(about = "Print the interpreter path of a virtualenv.")]
    Python(PythonArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(
        value_name = "PYTHON",
        help = "Interpreter version, executable name, or path (defaults to the project interpreter)"
    )]
    pub python: Option<String>,
    #[arg(short, long, help = "Name the virtualenv instead of deriving it from the interpreter")]
    pub name: Option<String>,
    #[arg(
        short = 'w',
        long = "with",
        value_enum,
        help = "Backend used to create the virtualenv (defaults to [tool.venvx] backend)"
    )]
    pub backend: Option<BackendArg>,
    #[arg(short, long, help = "Recreate the virtualenv if it already exists")]
    pub force: bool,
    #[arg(short, long, help = "Create the virtualenv at <project>/.venv")]
    pub in_project: bool,
    #[arg(last = true, help = "Extra arguments passed verbatim to the backend tool")]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[arg(value_name = "KEY")]
    pub key: String,
    #[arg(short, long, help = "Confirm the removal")]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct PythonArgs {
    #[arg(value_name = "KEY")]
    pub key: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendArg {
    Virtualenv,
    Venv,
    Conda,
}

impl From<BackendArg> for BackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Virtualenv => BackendKind::Virtualenv,
            BackendArg::Venv => BackendKind::Venv,
            BackendArg::Conda => BackendKind::Conda,
        }
    }
}
