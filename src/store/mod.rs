//! Form state store: the persisted key-value form between runs.
//!
//! State is one flat JSON object of string values:
//!
//! ```text
//! {
//!   "envrunner.platform": "PLA",
//!   "envrunner.timeout": "280000",
//!   ...
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::context::ServiceContext;
use crate::request::RunForm;

/// Persistence for the last-used run form.
///
/// All I/O goes through `ctx.fs` so the store can be exercised in memory.
pub struct StateStore<'a> {
    ctx: &'a ServiceContext,
    path: PathBuf,
}

impl<'a> StateStore<'a> {
    /// Creates a store backed by the JSON file at `path`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, path: &Path) -> Self {
        Self { ctx, path: path.to_path_buf() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the raw persisted entries. A missing file yields no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn entries(&self) -> Result<BTreeMap<String, String>, String> {
        if !self.ctx.fs.exists(&self.path) {
            return Ok(BTreeMap::new());
        }
        let contents = self
            .ctx
            .fs
            .read_to_string(&self.path)
            .map_err(|e| format!("Failed to read state file {}: {e}", self.path.display()))?;
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse state file {}: {e}", self.path.display()))
    }

    /// Loads the last saved form, falling back to defaults for anything missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<RunForm, String> {
        let entries = self.entries()?;
        debug!(path = %self.path.display(), keys = entries.len(), "loaded form state");
        Ok(RunForm::from_entries(&entries))
    }

    /// Saves the form, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, form: &RunForm) -> Result<(), String> {
        let json = serde_json::to_string_pretty(&form.to_entries())
            .map_err(|e| format!("Failed to serialize form state: {e}"))?;
        self.ctx
            .fs
            .write(&self.path, &json)
            .map_err(|e| format!("Failed to write state file {}: {e}", self.path.display()))?;
        debug!(path = %self.path.display(), "saved form state");
        Ok(())
    }

    /// Deletes the stored state so the next load yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be removed.
    pub fn reset(&self) -> Result<(), String> {
        self.ctx
            .fs
            .remove(&self.path)
            .map_err(|e| format!("Failed to remove state file {}: {e}", self.path.display()))
    }
}
