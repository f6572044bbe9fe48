//! Command dispatch and handlers.

pub mod command;
pub mod report;
pub mod run;
pub mod state;

use std::env;

use tracing::warn;

use crate::cli::{Cli, Command, RunArgs, StateAction};
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::execution::ActiveProcess;
use crate::request::RunForm;
use crate::store::StateStore;

/// Dispatch a parsed command line to its handler using the live adapters.
///
/// # Errors
///
/// Returns an error string if settings cannot be resolved or the selected
/// command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let ctx = ServiceContext::live();
    let project_root = match &cli.project_root {
        Some(root) => root.clone(),
        None => env::current_dir()
            .map_err(|e| format!("Failed to determine current directory: {e}"))?,
    };
    let settings = Settings::resolve(
        &project_root,
        cli.state_file.as_deref(),
        ctx.fs.as_ref(),
        |key| env::var(key).ok(),
    )?;
    dispatch_with_context(&cli.command, &ctx, &settings)
}

/// Dispatch a command with the given service context and settings.
fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Command(args) => command::run(ctx, settings, args),
        Command::Run(args) => run::run(ctx, settings, args),
        Command::Report { work_dir } => report::run(ctx, settings, work_dir.as_deref()),
        Command::State { action: StateAction::Show } => state::show(ctx, settings),
        Command::State { action: StateAction::Reset } => state::reset(ctx, settings),
    }
}

/// Loads the saved form and applies configuration and command-line overrides.
///
/// A configured working directory replaces the saved one unless `--work-dir`
/// was given.
fn merged_form(
    store: &StateStore<'_>,
    settings: &Settings,
    args: &RunArgs,
) -> Result<RunForm, String> {
    let mut form = store.load()?;
    if let Some(work_dir) = &settings.work_dir {
        form.work_dir.clone_from(work_dir);
    }
    args.apply_to(&mut form);
    Ok(form)
}

/// Stops whatever `active` is running when Ctrl-C arrives. The child runs in
/// its own process group, so it never sees the terminal's SIGINT itself.
fn stop_on_interrupt(active: ActiveProcess, what: &'static str) {
    if let Err(e) = ctrlc::set_handler(move || {
        if active.stop() {
            eprintln!("Stopping {what}...");
        }
    }) {
        warn!("Failed to install Ctrl-C handler: {e}");
    }
}
