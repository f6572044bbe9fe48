//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the command-building core and an
//! external system (time, filesystem, IDs, child processes, TCP ports).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod network;
pub mod process;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use network::PortManager;
pub use process::{OutputStream, ProcessEvent, ProcessHandle, ProcessRunner, StopSignal};

/// Error type shared by fallible port methods.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;
