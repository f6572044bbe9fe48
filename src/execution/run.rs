//! The test-run flow.

use std::io::Write;

use chrono::Duration;
use tracing::info;

use super::{workdir, ExecutionError, Notification, Panel};
use crate::command;
use crate::request::{RunForm, RunRequest};
use crate::store::StateStore;

/// What happened during a finished test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The effective command that ran.
    pub command: String,
    /// Exit code of the shell.
    pub exit_code: i32,
    /// Wall time from start to termination.
    pub elapsed: Duration,
    /// The finish notification that was emitted.
    pub notification: Notification,
}

impl Panel<'_> {
    /// Validates `form` into a request, filling BrowserStack credentials the
    /// form leaves empty from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Invalid`] listing every malformed field.
    pub fn prepare(&self, form: &RunForm) -> Result<RunRequest, ExecutionError> {
        let mut request = form.validate()?;
        fill_blank(&mut request.bs_username, self.settings.bs_username.as_deref());
        fill_blank(&mut request.bs_access_key, self.settings.bs_access_key.as_deref());
        Ok(request)
    }

    /// Validates `form` and builds its effective command without running it.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Invalid`] listing every malformed field.
    pub fn command_for(&self, form: &RunForm) -> Result<String, ExecutionError> {
        let request = self.prepare(form)?;
        Ok(command::build(&request, self.ctx.id_gen.as_ref()))
    }

    /// Validates, persists and runs `form`, streaming output into `log`.
    ///
    /// A non-zero exit is reported through the outcome, not as an error, and
    /// is never retried.
    ///
    /// # Errors
    ///
    /// Returns an error without starting anything when another run is
    /// active, the form is invalid, the state cannot be saved or the working
    /// directory does not exist. Spawn failures and log write failures are
    /// also errors.
    pub fn run_tests(
        &self,
        form: &RunForm,
        store: &StateStore<'_>,
        log: &mut dyn Write,
    ) -> Result<RunOutcome, ExecutionError> {
        if self.active.is_running() {
            return Err(ExecutionError::AlreadyRunning);
        }
        let request = self.prepare(form)?;
        let command = command::build(&request, self.ctx.id_gen.as_ref());
        store.save(form).map_err(ExecutionError::State)?;

        let work_dir =
            workdir::existing(self.ctx.fs.as_ref(), &self.settings.project_root, &form.work_dir)?;
        info!(
            platform = %request.platform,
            project = %request.project,
            runner = %request.runner,
            cwd = %work_dir.display(),
            "starting test run"
        );

        let started = self.ctx.clock.now();
        let mut handle = self.start(&command, &work_dir)?;
        let exit_code = self.pump(handle.as_mut(), log, |_| {})?;
        writeln!(log, "\nProcess finished with exit code {exit_code}")?;
        let elapsed = self.ctx.clock.now() - started;

        let notification = Notification::tests_finished(exit_code, elapsed);
        notification.emit();
        Ok(RunOutcome { command, exit_code, elapsed, notification })
    }
}

fn fill_blank(slot: &mut String, fallback: Option<&str>) {
    if slot.trim().is_empty() {
        if let Some(value) = fallback {
            *slot = value.trim().to_string();
        }
    }
}
