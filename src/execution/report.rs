//! The report-server flow: free the port, serve, retry once on a random port.

use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use super::{workdir, ExecutionError, Notification, Panel};
use crate::config::Settings;
use crate::request::DEFAULT_WORK_DIR;

const PORT_BUSY: &str = "address already in use";

/// How the report server is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Port tried first.
    pub port: u16,
    /// Report directory, relative to the working directory.
    pub report_dir: String,
    /// Pause after killing a stale server before starting a new one.
    pub settle: Duration,
}

impl ReportOptions {
    /// Options taken from resolved settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            port: settings.report_port,
            report_dir: settings.report_dir.clone(),
            settle: Duration::from_millis(300),
        }
    }
}

/// What happened when serving the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    /// Exit code of the last server process.
    pub exit_code: i32,
    /// Whether the server was restarted on a random port.
    pub retried: bool,
    /// The finish notification that was emitted.
    pub notification: Notification,
}

/// `yarn playwright show-report` for `report_dir` on `port`.
#[must_use]
pub fn report_command(report_dir: &str, port: u16) -> String {
    format!("yarn playwright show-report {report_dir} --port={port}")
}

impl Panel<'_> {
    /// Serves the Playwright HTML report from `work_dir`, an empty value
    /// meaning the default working directory.
    ///
    /// A server already holding the port is killed first. If the new server
    /// still reports the address in use, it is started once more with
    /// `--port=0`.
    ///
    /// # Errors
    ///
    /// Returns an error without starting anything when a test run is active
    /// or the working directory does not exist. Spawn failures and log write
    /// failures are also errors.
    pub fn open_report(
        &self,
        work_dir: &str,
        options: &ReportOptions,
        log: &mut dyn Write,
    ) -> Result<ReportOutcome, ExecutionError> {
        if self.active.is_running() {
            return Err(ExecutionError::AlreadyRunning);
        }
        let raw = if work_dir.trim().is_empty() { DEFAULT_WORK_DIR } else { work_dir };
        let work_dir = workdir::existing(self.ctx.fs.as_ref(), &self.settings.project_root, raw)?;

        let port = options.port;
        if self.ctx.ports.is_in_use(port) {
            writeln!(log, "Port {port} is in use. Attempting to stop existing report server...")?;
            if self.ctx.ports.kill_owner(port, &work_dir) {
                writeln!(log, "Killed processes on port {port}.")?;
                thread::sleep(options.settle);
            } else {
                writeln!(
                    log,
                    "No processes killed or kill failed for port {port}. Will retry on random port if needed."
                )?;
            }
        }

        let (mut exit_code, busy) = self.serve(&options.report_dir, port, &work_dir, log)?;
        if busy {
            info!(port, "report port busy, retrying on a random port");
            writeln!(log, "Port {port} is still busy. Retrying on a random port...")?;
            (exit_code, _) = self.serve(&options.report_dir, 0, &work_dir, log)?;
        }

        let notification = Notification::report_finished(exit_code);
        notification.emit();
        Ok(ReportOutcome { exit_code, retried: busy, notification })
    }

    /// Runs one server to completion. Also reports whether its output said
    /// the address was in use.
    fn serve(
        &self,
        report_dir: &str,
        port: u16,
        work_dir: &Path,
        log: &mut dyn Write,
    ) -> Result<(i32, bool), ExecutionError> {
        let command = report_command(report_dir, port);
        writeln!(log, "Running: {command} (cwd={})", work_dir.display())?;
        debug!(%command, "starting report server");

        let mut watch = PhraseWatch::new(PORT_BUSY);
        let mut handle = self.start(&command, work_dir)?;
        let exit_code = self.pump(handle.as_mut(), log, |text| watch.feed(text))?;
        writeln!(log, "\nShow report process finished with exit code {exit_code}")?;
        Ok((exit_code, watch.seen))
    }
}

/// Case-insensitive search for a phrase across consecutive output chunks.
struct PhraseWatch {
    phrase: &'static str,
    tail: String,
    seen: bool,
}

impl PhraseWatch {
    fn new(phrase: &'static str) -> Self {
        Self { phrase, tail: String::new(), seen: false }
    }

    fn feed(&mut self, text: &str) {
        let mut window = std::mem::take(&mut self.tail);
        window.push_str(&text.to_ascii_lowercase());
        self.seen |= window.contains(self.phrase);

        let keep = self.phrase.chars().count().saturating_sub(1);
        let start = match keep.checked_sub(1) {
            Some(back) => window.char_indices().rev().nth(back).map_or(0, |(i, _)| i),
            None => window.len(),
        };
        self.tail = window.split_off(start);
    }
}
