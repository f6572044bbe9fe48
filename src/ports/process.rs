//! Process runner port for launching shell commands with streamed output.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::PortError;

/// Which pipe an output chunk was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    /// The child's standard output.
    Stdout,
    /// The child's standard error.
    Stderr,
}

/// An event emitted by a running process.
///
/// A handle yields any number of `Output` events followed by exactly one
/// `Terminated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// A chunk of text read from one of the child's pipes.
    Output {
        /// The pipe the chunk came from.
        stream: OutputStream,
        /// The text, decoded lossily as UTF-8.
        text: String,
    },
    /// The process exited.
    Terminated {
        /// Exit code; `128 + signal` when the process was killed by a signal.
        exit_code: i32,
    },
}

/// A clonable request to stop a running process.
///
/// Stopping is cooperative: the runner is asked to signal graceful
/// termination and the process may still produce output before exiting.
#[derive(Clone)]
pub struct StopSignal(Arc<dyn Fn() + Send + Sync>);

impl StopSignal {
    /// Wraps the runner-specific stop action.
    pub fn new(stop: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(stop))
    }

    /// A stop signal that does nothing, for processes that already exited.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Requests graceful termination.
    pub fn stop(&self) {
        (self.0)();
    }
}

impl fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StopSignal")
    }
}

/// A live process started by a [`ProcessRunner`].
pub trait ProcessHandle: Send {
    /// Blocks until the next event is available.
    ///
    /// Returns `None` once the `Terminated` event has been delivered.
    fn next_event(&mut self) -> Option<ProcessEvent>;

    /// Returns a signal that can stop this process from another thread.
    fn stop_signal(&self) -> StopSignal;
}

/// Starts shell commands as child processes.
pub trait ProcessRunner: Send + Sync {
    /// Starts `/bin/sh -c <command>` in `work_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn start(&self, command: &str, work_dir: &Path) -> Result<Box<dyn ProcessHandle>, PortError>;
}
