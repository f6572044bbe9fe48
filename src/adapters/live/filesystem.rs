//! Disk-backed filesystem adapter using `std::fs`.

use std::io::ErrorKind;
use std::path::Path;

use crate::ports::filesystem::FileSystem;
use crate::ports::PortError;

/// Filesystem adapter backed by real disk I/O.
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn remove(&self, path: &Path) -> Result<(), PortError> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
