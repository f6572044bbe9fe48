//! Settings resolution.
//!
//! Precedence, highest first: command-line flags, environment variables
//! (after `.env` is loaded), `envrunner.yaml` in the project root, built-in
//! defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ports::FileSystem;

/// Settings file looked up in the project root.
pub const SETTINGS_FILE: &str = "envrunner.yaml";
/// State file location relative to the project root.
pub const DEFAULT_STATE_FILE: &str = ".envrunner/state.json";
/// Port the Playwright report server listens on first.
pub const DEFAULT_REPORT_PORT: u16 = 9323;
/// Directory holding the generated HTML report, relative to the working directory.
pub const DEFAULT_REPORT_DIR: &str = "playwright-report";

const ENV_STATE: &str = "ENVRUNNER_STATE";
const ENV_WORK_DIR: &str = "ENVRUNNER_WORK_DIR";
const ENV_REPORT_PORT: &str = "ENVRUNNER_REPORT_PORT";
const ENV_BS_USERNAME: &str = "BROWSERSTACK_USERNAME";
const ENV_BS_ACCESS_KEY: &str = "BROWSERSTACK_ACCESS_KEY";

/// Optional keys of `envrunner.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
struct FileSettings {
    state_file: Option<PathBuf>,
    work_dir: Option<String>,
    report_port: Option<u16>,
    report_dir: Option<String>,
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base for relative working directories and the state file.
    pub project_root: PathBuf,
    /// Where the form state is persisted.
    pub state_file: PathBuf,
    /// Working directory forced by configuration, overriding the saved one.
    pub work_dir: Option<String>,
    /// First port tried by the report server.
    pub report_port: u16,
    /// Report directory passed to `show-report`.
    pub report_dir: String,
    /// BrowserStack user used when the form leaves it empty.
    pub bs_username: Option<String>,
    /// BrowserStack access key used when the form leaves it empty.
    pub bs_access_key: Option<String>,
}

impl Settings {
    /// Resolves settings from flags, environment and the settings file.
    ///
    /// `env` looks up an environment variable; empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `envrunner.yaml` exists but is unreadable or
    /// invalid, or if `ENVRUNNER_REPORT_PORT` is not a port number.
    pub fn resolve(
        project_root: &Path,
        state_file_flag: Option<&Path>,
        fs: &dyn FileSystem,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let file = load_file_settings(project_root, fs)?;

        let state_file = state_file_flag
            .map(Path::to_path_buf)
            .or_else(|| env(ENV_STATE).map(PathBuf::from))
            .or(file.state_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

        let report_port = match env(ENV_REPORT_PORT) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| format!("{ENV_REPORT_PORT} is not a valid port: {raw:?}"))?,
            None => file.report_port.unwrap_or(DEFAULT_REPORT_PORT),
        };

        Ok(Self {
            project_root: project_root.to_path_buf(),
            state_file: project_root.join(state_file),
            work_dir: env(ENV_WORK_DIR).or(file.work_dir),
            report_port,
            report_dir: file.report_dir.unwrap_or_else(|| DEFAULT_REPORT_DIR.to_string()),
            bs_username: env(ENV_BS_USERNAME),
            bs_access_key: env(ENV_BS_ACCESS_KEY),
        })
    }
}

fn load_file_settings(project_root: &Path, fs: &dyn FileSystem) -> Result<FileSettings, String> {
    let path = project_root.join(SETTINGS_FILE);
    if !fs.exists(&path) {
        return Ok(FileSettings::default());
    }
    let contents = fs
        .read_to_string(&path)
        .map_err(|e| format!("Failed to read settings file {}: {e}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(FileSettings::default());
    }
    serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse settings file {}: {e}", path.display()))
}
