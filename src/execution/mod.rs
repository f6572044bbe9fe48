//! The run controller: validates forms, launches processes, streams output.
//!
//! A [`Panel`] plays the role of the run panel: one test run at a time,
//! output copied to a log sink as it arrives, a notification at the end.

pub mod notify;
pub mod report;
pub mod run;
pub mod workdir;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::warn;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::ports::{ProcessEvent, ProcessHandle, StopSignal};
use crate::request::InvalidRun;

pub use notify::{Level, Notification};
pub use report::{ReportOptions, ReportOutcome};
pub use run::RunOutcome;

/// Why a run or report could not be carried out.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The form did not validate; nothing was started.
    #[error(transparent)]
    Invalid(#[from] InvalidRun),
    /// The working directory does not exist; nothing was started.
    #[error("Working directory not found: {raw}. Expected at: {}", expected.display())]
    WorkDirNotFound {
        /// The directory as entered.
        raw: String,
        /// Where it was looked up.
        expected: PathBuf,
    },
    /// A test run is already in progress on this panel.
    #[error("A test run is already in progress")]
    AlreadyRunning,
    /// The shell could not be spawned.
    #[error("Failed to start `{command}`: {reason}")]
    Spawn {
        /// Command that failed to start.
        command: String,
        /// Spawn failure.
        reason: String,
    },
    /// Form state could not be saved.
    #[error("{0}")]
    State(String),
    /// Output could not be written to the log sink.
    #[error("Failed to write output: {0}")]
    Log(#[from] std::io::Error),
}

/// Shared slot for the stop signal of whatever process is running.
///
/// Clones share the slot, so a Ctrl-C handler can stop the current run.
#[derive(Debug, Clone, Default)]
pub struct ActiveProcess(Arc<Mutex<Option<StopSignal>>>);

impl ActiveProcess {
    /// Whether a process is registered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Requests graceful termination of the registered process.
    ///
    /// Returns `false` when nothing is running.
    pub fn stop(&self) -> bool {
        let signal = self.0.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match signal {
            Some(signal) => {
                signal.stop();
                true
            }
            None => false,
        }
    }

    fn set(&self, signal: StopSignal) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(signal);
    }

    fn clear(&self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Drives test runs and report servers for one project.
pub struct Panel<'a> {
    ctx: &'a ServiceContext,
    settings: &'a Settings,
    active: ActiveProcess,
}

impl<'a> Panel<'a> {
    /// Creates a panel over the given ports and settings.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, settings: &'a Settings) -> Self {
        Self { ctx, settings, active: ActiveProcess::default() }
    }

    /// The stop slot for the process this panel is running.
    #[must_use]
    pub fn active(&self) -> ActiveProcess {
        self.active.clone()
    }

    fn start(
        &self,
        command: &str,
        work_dir: &Path,
    ) -> Result<Box<dyn ProcessHandle>, ExecutionError> {
        let handle = self.ctx.processes.start(command, work_dir).map_err(|e| {
            ExecutionError::Spawn { command: command.to_string(), reason: e.to_string() }
        })?;
        self.active.set(handle.stop_signal());
        Ok(handle)
    }

    /// Copies output to `log` until the process terminates, then clears the
    /// stop slot.
    fn pump(
        &self,
        handle: &mut dyn ProcessHandle,
        log: &mut dyn Write,
        inspect: impl FnMut(&str),
    ) -> Result<i32, ExecutionError> {
        let result = drain(handle, log, inspect);
        self.active.clear();
        result
    }
}

/// Passes each output chunk to `inspect` and `log`. Returns the exit code,
/// or `-1` if the event stream ended without one.
///
/// A failed write stops the process; events are still consumed until it
/// terminates, then the write error is returned.
fn drain(
    handle: &mut dyn ProcessHandle,
    log: &mut dyn Write,
    mut inspect: impl FnMut(&str),
) -> Result<i32, ExecutionError> {
    let mut write_error = None;
    let mut exit_code = -1;
    while let Some(event) = handle.next_event() {
        match event {
            ProcessEvent::Output { text, .. } => {
                inspect(&text);
                if write_error.is_none() {
                    if let Err(e) = log.write_all(text.as_bytes()).and_then(|()| log.flush()) {
                        warn!("output sink failed, stopping process: {e}");
                        handle.stop_signal().stop();
                        write_error = Some(e);
                    }
                }
            }
            ProcessEvent::Terminated { exit_code: code } => {
                exit_code = code;
                break;
            }
        }
    }
    match write_error {
        Some(e) => Err(e.into()),
        None => Ok(exit_code),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{exited, out, test_context, test_settings, ScriptedRunner};

    #[test]
    fn stop_reaches_running_process_until_it_finishes() {
        let runner = ScriptedRunner::new(vec![vec![out("working\n"), exited(143)]]);
        let stops = runner.stops();
        let mut ctx = test_context();
        ctx.processes = Box::new(runner);
        let settings = test_settings("/repo");
        let panel = Panel::new(&ctx, &settings);
        let active = panel.active();

        let mut handle = panel.start("yarn test", Path::new("/repo")).unwrap();
        assert!(active.is_running());
        assert!(active.stop());
        assert_eq!(stops.load(Ordering::SeqCst), 1);

        let mut log = Vec::new();
        let code = panel.pump(handle.as_mut(), &mut log, |_| {}).unwrap();

        assert_eq!(code, 143);
        assert_eq!(log, b"working\n");
        assert!(!active.is_running());
        assert!(!active.stop());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_stops_process_and_waits_for_exit() {
        let runner =
            ScriptedRunner::new(vec![vec![out("first\n"), out("second\n"), exited(143)]]);
        let stops = runner.stops();
        let mut ctx = test_context();
        ctx.processes = Box::new(runner);
        let settings = test_settings("/repo");
        let panel = Panel::new(&ctx, &settings);
        let mut seen = Vec::new();

        let mut handle = panel.start("yarn test", Path::new("/repo")).unwrap();
        let err = panel
            .pump(handle.as_mut(), &mut BrokenPipe, |text| seen.push(text.to_string()))
            .unwrap_err();

        assert!(matches!(err, ExecutionError::Log(_)));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(seen, ["first\n", "second\n"]);
        assert!(handle.next_event().is_none());
        assert!(!panel.active().is_running());
    }

    #[test]
    fn live_process_is_stopped_when_output_cannot_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let mut ctx = test_context();
        ctx.processes = Box::new(crate::adapters::live::process::ShellProcessRunner);
        let settings = test_settings("/repo");
        let panel = Panel::new(&ctx, &settings);

        let mut handle = panel.start("echo hi; sleep 1; touch marker", dir.path()).unwrap();
        let result = panel.pump(handle.as_mut(), &mut BrokenPipe, |_| {});
        std::thread::sleep(std::time::Duration::from_millis(1500));

        assert!(result.is_err());
        assert!(!marker.exists());
    }

    #[test]
    fn stream_without_exit_reports_minus_one() {
        let runner = ScriptedRunner::new(vec![vec![out("partial")]]);
        let mut ctx = test_context();
        ctx.processes = Box::new(runner);
        let settings = test_settings("/repo");
        let panel = Panel::new(&ctx, &settings);

        let mut handle = panel.start("yarn test", Path::new("/repo")).unwrap();
        let code = panel.pump(handle.as_mut(), &mut Vec::new(), |_| {}).unwrap();

        assert_eq!(code, -1);
    }

    #[test]
    fn spawn_failure_names_the_command() {
        let ctx = test_context();
        let settings = test_settings("/repo");
        let panel = Panel::new(&ctx, &settings);

        let err = panel.start("yarn test", Path::new("/repo")).err().unwrap();

        assert!(err.to_string().starts_with("Failed to start `yarn test`:"));
        assert!(!panel.active().is_running());
    }
}
