//! Working-directory resolution.

use std::path::{Component, Path, PathBuf};

use super::ExecutionError;
use crate::ports::FileSystem;

/// Joins `raw` onto `project_root` unless it is absolute, then removes `.`
/// and `..` components lexically.
#[must_use]
pub fn resolve(project_root: &Path, raw: &str) -> PathBuf {
    let raw = Path::new(raw.trim());
    let joined = if raw.is_absolute() { raw.to_path_buf() } else { project_root.join(raw) };
    normalize(&joined)
}

/// Resolves `raw` and checks that it names an existing directory.
///
/// # Errors
///
/// Returns [`ExecutionError::WorkDirNotFound`] when the resolved path is not
/// a directory.
pub fn existing(fs: &dyn FileSystem, project_root: &Path, raw: &str) -> Result<PathBuf, ExecutionError> {
    let resolved = resolve(project_root, raw);
    if fs.is_dir(&resolved) {
        Ok(resolved)
    } else {
        Err(ExecutionError::WorkDirNotFound { raw: raw.trim().to_string(), expected: resolved })
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemFs;

    #[test]
    fn relative_paths_join_the_project_root() {
        assert_eq!(
            resolve(Path::new("/repo"), "packages/automation-testing"),
            PathBuf::from("/repo/packages/automation-testing")
        );
    }

    #[test]
    fn absolute_paths_are_kept() {
        assert_eq!(resolve(Path::new("/repo"), " /srv/e2e "), PathBuf::from("/srv/e2e"));
    }

    #[test]
    fn dot_segments_are_collapsed() {
        assert_eq!(
            resolve(Path::new("/repo/app"), "./../packages/./e2e"),
            PathBuf::from("/repo/packages/e2e")
        );
    }

    #[test]
    fn missing_directory_reports_expected_location() {
        let fs = MemFs::default();
        fs.add_dir("/repo/e2e");

        assert_eq!(existing(&fs, Path::new("/repo"), "e2e").unwrap(), PathBuf::from("/repo/e2e"));

        let err = existing(&fs, Path::new("/repo"), "missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Working directory not found: missing. Expected at: /repo/missing"
        );
    }
}
