//! Finish notifications for test runs and report servers.

use std::fmt;

use chrono::Duration;
use tracing::{error, info, warn};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Normal completion.
    Info,
    /// Completed with a problem worth a look.
    Warning,
    /// Failed.
    Error,
}

/// A user-facing message emitted when a process finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Message text.
    pub message: String,
}

impl Notification {
    /// Summarizes a finished test run.
    #[must_use]
    pub fn tests_finished(exit_code: i32, elapsed: Duration) -> Self {
        let seconds = seconds(elapsed);
        if exit_code == 0 {
            Self {
                level: Level::Info,
                message: format!("Tests finished successfully in {seconds:.1}s (exit code 0)"),
            }
        } else {
            Self {
                level: Level::Error,
                message: format!("Tests failed with exit code {exit_code} in {seconds:.1}s"),
            }
        }
    }

    /// Summarizes a finished report server.
    #[must_use]
    pub fn report_finished(exit_code: i32) -> Self {
        let level = if exit_code == 0 { Level::Info } else { Level::Warning };
        Self { level, message: format!("Show report finished (exit {exit_code})") }
    }

    /// Sends the notification to the log at its severity.
    pub fn emit(&self) {
        match self.level {
            Level::Info => info!("{}", self.message),
            Level::Warning => warn!("{}", self.message),
            Level::Error => error!("{}", self.message),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[allow(clippy::cast_precision_loss)]
fn seconds(elapsed: Duration) -> f64 {
    elapsed.num_milliseconds().max(0) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_reports_duration_with_one_decimal() {
        let note = Notification::tests_finished(0, Duration::milliseconds(12_345));

        assert_eq!(note.level, Level::Info);
        assert_eq!(note.message, "Tests finished successfully in 12.3s (exit code 0)");
    }

    #[test]
    fn failure_reports_exit_code() {
        let note = Notification::tests_finished(2, Duration::milliseconds(1_060));

        assert_eq!(note.level, Level::Error);
        assert_eq!(note.message, "Tests failed with exit code 2 in 1.1s");
    }

    #[test]
    fn report_failures_are_warnings() {
        assert_eq!(Notification::report_finished(0).level, Level::Info);
        let note = Notification::report_finished(1);
        assert_eq!(note.level, Level::Warning);
        assert_eq!(note.to_string(), "Show report finished (exit 1)");
    }
}
