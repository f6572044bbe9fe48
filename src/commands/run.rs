//! `envrunner run`.

use std::io;

use super::{merged_form, stop_on_interrupt};
use crate::cli::RunArgs;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::execution::Panel;
use crate::store::StateStore;

/// Execute the `run` command.
///
/// Saves the merged form, runs the tests with output on stdout and stops the
/// child process group on Ctrl-C.
///
/// # Errors
///
/// Returns an error string if the run cannot start or the tests exit with a
/// non-zero code.
pub fn run(ctx: &ServiceContext, settings: &Settings, args: &RunArgs) -> Result<(), String> {
    let store = StateStore::new(ctx, &settings.state_file);
    let form = merged_form(&store, settings, args)?;
    let panel = Panel::new(ctx, settings);

    stop_on_interrupt(panel.active(), "test run");

    let outcome = panel
        .run_tests(&form, &store, &mut io::stdout().lock())
        .map_err(|e| e.to_string())?;
    if outcome.exit_code == 0 {
        Ok(())
    } else {
        Err(outcome.notification.message)
    }
}
