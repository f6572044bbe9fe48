//! Core library entry for the `envrunner` CLI.
//!
//! `envrunner` turns a set of run parameters into the shell command that
//! launches a Playwright or Jest end-to-end suite, then runs it, serves the
//! HTML report and remembers the last-used parameters.

pub mod adapters;
pub mod cli;
pub mod command;
pub mod commands;
pub mod config;
pub mod context;
pub mod execution;
pub mod logging;
pub mod ports;
pub mod request;
pub mod store;

#[cfg(test)]
mod testing;

use clap::error::ErrorKind;
use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// Help and version requests are printed to stdout and count as success.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    logging::init(cli.verbose);
    commands::dispatch(&cli)
}
