//! `envrunner command`.

use super::merged_form;
use crate::cli::RunArgs;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::execution::Panel;
use crate::store::StateStore;

/// Execute the `command` command.
///
/// Prints the effective command for the saved form merged with `args`.
/// Nothing is saved or run.
///
/// # Errors
///
/// Returns an error string if the saved state is unreadable or the merged
/// form does not validate.
pub fn run(ctx: &ServiceContext, settings: &Settings, args: &RunArgs) -> Result<(), String> {
    let store = StateStore::new(ctx, &settings.state_file);
    let form = merged_form(&store, settings, args)?;
    let command = Panel::new(ctx, settings).command_for(&form).map_err(|e| e.to_string())?;
    println!("{command}");
    Ok(())
}
