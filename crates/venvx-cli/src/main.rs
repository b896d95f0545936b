use std::sync::Arc;

use atty::Stream;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use venvx_core::{
    self, CommandContext, CommandGroup, CommandInfo, ExecutionOutcome, GlobalOptions,
    SystemEffects, VenvCreateRequest, VenvListRequest, VenvPythonRequest, VenvRemoveRequest,
};

mod cli;
mod style;

use cli::{CommandGroupCli, VenvxCli};
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = VenvxCli::parse();
    init_tracing(cli.trace, cli.quiet, cli.verbose);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
    };
    let ctx = CommandContext::new(&global, Arc::new(SystemEffects::new()));
    let (info, outcome) = dispatch(&ctx, &cli.command).map_err(|err| eyre!("{err:?}"))?;
    let code = emit_output(&cli, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, quiet: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("venvx_core={level},venvx={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn dispatch(
    ctx: &CommandContext,
    group: &CommandGroupCli,
) -> anyhow::Result<(CommandInfo, ExecutionOutcome)> {
    match group {
        CommandGroupCli::Create(args) => {
            let info = CommandInfo::new(CommandGroup::Create, "create");
            let request = VenvCreateRequest {
                python: args.python.clone(),
                name: args.name.clone(),
                backend: args.backend.map(Into::into),
                force: args.force,
                in_project: args.in_project,
                args: args.args.clone(),
            };
            Ok((info, venvx_core::venv_create(ctx, &request)?))
        }
        CommandGroupCli::List => {
            let info = CommandInfo::new(CommandGroup::List, "list");
            Ok((info, venvx_core::venv_list(ctx, &VenvListRequest)?))
        }
        CommandGroupCli::Remove(args) => {
            let info = CommandInfo::new(CommandGroup::Remove, "remove");
            let request = VenvRemoveRequest {
                key: args.key.clone(),
                yes: args.yes,
            };
            Ok((info, venvx_core::venv_remove(ctx, &request)?))
        }
        CommandGroupCli::Python(args) => {
            let info = CommandInfo::new(CommandGroup::Python, "python");
            let request = VenvPythonRequest {
                key: args.key.clone(),
            };
            Ok((info, venvx_core::venv_python(ctx, &request)?))
        }
    }
}

fn emit_output(cli: &VenvxCli, info: CommandInfo, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = outcome.exit_code();
    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = venvx_core::to_json_response(info, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        if is_passthrough(&outcome.details) {
            println!("{}", outcome.message);
        } else if let Some(table) = render_venv_table(&style, info, &outcome.details) {
            println!("{table}");
        } else {
            let message = venvx_core::format_status_message(info, &outcome.message);
            println!("{}", style.status(&outcome.status, &message));
            if let Some(hint) = hint_from_details(&outcome.details) {
                println!("{}", style.info(&format!("Hint: {hint}")));
            }
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn is_passthrough(details: &Value) -> bool {
    details
        .as_object()
        .and_then(|map| map.get("passthrough"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn render_venv_table(style: &Style, info: CommandInfo, details: &Value) -> Option<String> {
    if info.group != CommandGroup::List {
        return None;
    }
    let venvs = details.get("venvs")?.as_array()?;
    if venvs.is_empty() {
        return None;
    }
    let rows: Vec<(String, String)> = venvs
        .iter()
        .filter_map(|venv| {
            Some((
                venv.get("key")?.as_str()?.to_string(),
                venv.get("path")?.as_str()?.to_string(),
            ))
        })
        .collect();
    let width = rows
        .iter()
        .map(|(key, _)| key.len())
        .chain(["Key".len()])
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    lines.push(style.table_header(&format!("{:<width$}  Location", "Key")));
    lines.push(format!("{:-<width$}  {:-<8}", "", ""));
    for (key, path) in rows {
        lines.push(format!("{key:<width$}  {path}"));
    }
    Some(lines.join("\n"))
}
