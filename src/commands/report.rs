//! `envrunner report`.

use std::io;

use super::stop_on_interrupt;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::execution::{Panel, ReportOptions};
use crate::store::StateStore;

/// Execute the `report` command.
///
/// Serves the report from `work_dir`, or from the configured or saved
/// working directory when none is given. Ctrl-C stops the server.
///
/// # Errors
///
/// Returns an error string if the saved state is unreadable or the report
/// server cannot be started.
pub fn run(ctx: &ServiceContext, settings: &Settings, work_dir: Option<&str>) -> Result<(), String> {
    let work_dir = match work_dir {
        Some(dir) => dir.to_string(),
        None => match &settings.work_dir {
            Some(dir) => dir.clone(),
            None => StateStore::new(ctx, &settings.state_file).load()?.work_dir,
        },
    };
    let options = ReportOptions::from_settings(settings);
    let panel = Panel::new(ctx, settings);
    stop_on_interrupt(panel.active(), "report server");
    panel
        .open_report(&work_dir, &options, &mut io::stdout().lock())
        .map_err(|e| e.to_string())?;
    Ok(())
}
