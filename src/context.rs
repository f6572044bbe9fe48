//! Service context bundling all port trait objects.

use crate::adapters::live::clock::SystemClock;
use crate::adapters::live::filesystem::DiskFileSystem;
use crate::adapters::live::id_gen::UuidGenerator;
use crate::adapters::live::network::LocalPortManager;
use crate::adapters::live::process::ShellProcessRunner;
use crate::ports::{Clock, FileSystem, IdGenerator, PortManager, ProcessRunner};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. [`ServiceContext::live`]
/// wires the real adapters; tests swap individual fields for fakes.
pub struct ServiceContext {
    /// Clock for measuring run durations.
    pub clock: Box<dyn Clock>,
    /// Filesystem for the state store and working-directory checks.
    pub fs: Box<dyn FileSystem>,
    /// ID generator for device-cloud run identifiers.
    pub id_gen: Box<dyn IdGenerator>,
    /// Runner for shell commands.
    pub processes: Box<dyn ProcessRunner>,
    /// Probe and killer for local TCP ports.
    pub ports: Box<dyn PortManager>,
}

impl ServiceContext {
    /// Creates a context with the real adapters for every port.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(SystemClock),
            fs: Box::new(DiskFileSystem),
            id_gen: Box::new(UuidGenerator),
            processes: Box::new(ShellProcessRunner),
            ports: Box::new(LocalPortManager::default()),
        }
    }
}
