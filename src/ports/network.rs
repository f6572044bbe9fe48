//! Port manager for probing and freeing local TCP ports.

use std::path::Path;

/// Probes local TCP ports and terminates whatever owns them.
pub trait PortManager: Send + Sync {
    /// Returns `true` if something on localhost accepts connections on `port`
    /// or the port cannot be bound.
    fn is_in_use(&self, port: u16) -> bool;

    /// Attempts to terminate every process bound to `port`.
    ///
    /// Best effort: returns `true` when the port is free afterwards.
    fn kill_owner(&self, port: u16, work_dir: &Path) -> bool;
}
