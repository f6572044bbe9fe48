//! Run parameters for a single test invocation.
//!
//! A [`RunForm`] holds what the user edits and what gets persisted, as
//! plain strings. Validating it yields a [`RunRequest`], the immutable value
//! the command builder reads.

mod choice;
mod form;
mod limits;

pub use choice::{DeviceCloud, E2eEnv, Mode, Platform, Project, Runner};
pub use form::{InvalidRun, RunForm, DEFAULT_WORK_DIR};
pub(crate) use form::SECRET_KEY;
pub use limits::{RepeatEach, Timeout, ValidationError, Workers};

/// Everything needed to build one effective command.
///
/// Boolean and numeric fields stay string-encoded because they are exported
/// verbatim as environment values and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Target platform, exported as `PLATFORM`.
    pub platform: Platform,
    /// Backend environment, exported as `E2E_ENV` unless forced by `PROD`.
    pub e2e_env: E2eEnv,
    /// `"true"`/`"false"`, exported as `USE_PREDEFINED_ENV_URL`.
    pub use_predefined_url: String,
    /// `"true"`/`"false"`, exported as `MOCK_SERVER`.
    pub mock_server: String,
    /// Exported as `CI`.
    pub ci: String,
    /// Exported as `RCV_CANARY_VERSION`; may be empty.
    pub canary_version: String,
    /// JSON payload exported as `RWC_REGRESSION_FFS`; may be empty.
    pub regression_feature_flags: String,
    /// Test-name filter; `|` separates alternatives.
    pub grep: String,
    /// Browser or device target.
    pub project: Project,
    /// Per-test timeout in milliseconds.
    pub timeout: String,
    /// Repeat-each count.
    pub repeat: String,
    /// Worker count or `N%`.
    pub workers: String,
    /// Browser mode.
    pub mode: Mode,
    /// Test engine.
    pub runner: Runner,
    /// BrowserStack user; only read for device-cloud projects.
    pub bs_username: String,
    /// BrowserStack access key; only read for device-cloud projects.
    pub bs_access_key: String,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            e2e_env: E2eEnv::default(),
            use_predefined_url: "true".into(),
            mock_server: "true".into(),
            ci: "true".into(),
            canary_version: String::new(),
            regression_feature_flags: "{}".into(),
            grep: String::new(),
            project: Project::default(),
            timeout: "280000".into(),
            repeat: "0".into(),
            workers: "1".into(),
            mode: Mode::default(),
            runner: Runner::default(),
            bs_username: String::new(),
            bs_access_key: String::new(),
        }
    }
}
