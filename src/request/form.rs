//! The editable, persisted field set and its validation into a [`RunRequest`].

use std::collections::BTreeMap;

use thiserror::Error;

use super::limits::{RepeatEach, Timeout, ValidationError, Workers};
use super::{E2eEnv, Platform, RunRequest};

/// Working directory used when none is configured, relative to the project root.
pub const DEFAULT_WORK_DIR: &str = "packages/automation-testing";

const KEY_PLATFORM: &str = "envrunner.platform";
const KEY_E2E_ENV: &str = "envrunner.e2eEnv";
const KEY_USE_URL: &str = "envrunner.usePredefinedUrl";
const KEY_MOCK: &str = "envrunner.mockServer";
const KEY_GREP: &str = "envrunner.grep";
const KEY_PROJECT: &str = "envrunner.project";
const KEY_TIMEOUT: &str = "envrunner.timeout";
const KEY_REPEAT: &str = "envrunner.repeat";
const KEY_WORKERS: &str = "envrunner.workers";
const KEY_MODE: &str = "envrunner.mode";
const KEY_RUNNER: &str = "envrunner.runner";
const KEY_WORKDIR: &str = "envrunner.workdir";
const KEY_CANARY: &str = "envrunner.canary";
const KEY_FFS: &str = "envrunner.regressionFFs";
const KEY_BS_USER: &str = "envrunner.bsUsername";
const KEY_BS_KEY: &str = "envrunner.bsAccessKey";

/// Key holding the BrowserStack access key, masked when state is displayed.
pub(crate) const SECRET_KEY: &str = KEY_BS_KEY;

/// One or more fields failed validation; the run must not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please provide valid values.{}", bullets(.0))]
pub struct InvalidRun(pub Vec<ValidationError>);

fn bullets(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| format!("\n- {e}")).collect()
}

/// Raw run parameters as the user entered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunForm {
    /// Target platform.
    pub platform: String,
    /// Backend environment.
    pub e2e_env: String,
    /// Use the predefined environment URL.
    pub use_predefined_url: String,
    /// Enable the mock server.
    pub mock_server: String,
    /// Canary version query parameter, for example `25.9.12-rcv-136333`.
    pub canary_version: String,
    /// Feature-flag JSON applied through local storage.
    pub regression_feature_flags: String,
    /// Test-name filter.
    pub grep: String,
    /// Browser or device target.
    pub project: String,
    /// Per-test timeout in milliseconds.
    pub timeout: String,
    /// Repeat-each count.
    pub repeat: String,
    /// Worker count or percentage.
    pub workers: String,
    /// Browser mode.
    pub mode: String,
    /// Test engine.
    pub runner: String,
    /// BrowserStack user.
    pub bs_username: String,
    /// BrowserStack access key.
    pub bs_access_key: String,
    /// Directory the command runs in, absolute or relative to the project root.
    pub work_dir: String,
}

impl Default for RunForm {
    fn default() -> Self {
        let request = RunRequest::default();
        Self {
            platform: request.platform.to_string(),
            e2e_env: request.e2e_env.to_string(),
            use_predefined_url: request.use_predefined_url,
            mock_server: request.mock_server,
            canary_version: request.canary_version,
            regression_feature_flags: request.regression_feature_flags,
            grep: request.grep,
            project: request.project.to_string(),
            timeout: request.timeout,
            repeat: request.repeat,
            workers: request.workers,
            mode: request.mode.to_string(),
            runner: request.runner.to_string(),
            bs_username: request.bs_username,
            bs_access_key: request.bs_access_key,
            work_dir: DEFAULT_WORK_DIR.to_string(),
        }
    }
}

impl RunForm {
    /// Keeps platform and environment consistent.
    ///
    /// `PROD` pins the environment to `PROD` without the predefined URL; any
    /// other platform may not select the `PROD` environment and falls back to
    /// the default one.
    pub fn normalize_environment(&mut self) {
        if Platform::from(self.platform.as_str()) == Platform::Prod {
            self.e2e_env = E2eEnv::Prod.to_string();
            self.use_predefined_url = "false".into();
        } else if E2eEnv::from(self.e2e_env.as_str()) == E2eEnv::Prod {
            self.e2e_env = E2eEnv::default().to_string();
        }
    }

    /// Checks the numeric fields and produces the request to build.
    ///
    /// Numbers are re-rendered canonically; `CI` is always `true`.
    ///
    /// # Errors
    ///
    /// Returns every failing field when timeout, repeat-each or workers is
    /// malformed.
    pub fn validate(&self) -> Result<RunRequest, InvalidRun> {
        let timeout = self.timeout.parse::<Timeout>();
        let repeat = self.repeat.parse::<RepeatEach>();
        let workers = self.workers.parse::<Workers>();

        let (timeout, repeat, workers) = match (timeout, repeat, workers) {
            (Ok(timeout), Ok(repeat), Ok(workers)) => (timeout, repeat, workers),
            (timeout, repeat, workers) => {
                let errors = [timeout.err(), repeat.err(), workers.err()];
                return Err(InvalidRun(errors.into_iter().flatten().collect()));
            }
        };

        Ok(RunRequest {
            platform: self.platform.as_str().into(),
            e2e_env: self.e2e_env.as_str().into(),
            use_predefined_url: self.use_predefined_url.clone(),
            mock_server: self.mock_server.clone(),
            ci: "true".into(),
            canary_version: self.canary_version.trim().to_string(),
            regression_feature_flags: self.regression_feature_flags.trim().to_string(),
            grep: self.grep.clone(),
            project: self.project.as_str().into(),
            timeout: timeout.to_string(),
            repeat: repeat.to_string(),
            workers: workers.to_string(),
            mode: self.mode.as_str().into(),
            runner: self.runner.as_str().into(),
            bs_username: self.bs_username.trim().to_string(),
            bs_access_key: self.bs_access_key.trim().to_string(),
        })
    }

    /// Flattens the form into persisted key-value pairs.
    #[must_use]
    pub fn to_entries(&self) -> BTreeMap<String, String> {
        self.fields().into_iter().map(|(key, value)| (key.to_string(), value.clone())).collect()
    }

    /// Restores a form from persisted pairs over the defaults.
    ///
    /// Missing keys keep their default. Choice fields also keep the default
    /// when the stored value is empty.
    #[must_use]
    pub fn from_entries(entries: &BTreeMap<String, String>) -> Self {
        let mut form = Self::default();
        for (key, slot) in form.fields_mut() {
            let Some(stored) = entries.get(key) else { continue };
            if stored.is_empty() && is_choice(key) {
                continue;
            }
            slot.clone_from(stored);
        }
        form.normalize_environment();
        form
    }

    fn fields(&self) -> [(&'static str, &String); 16] {
        [
            (KEY_PLATFORM, &self.platform),
            (KEY_E2E_ENV, &self.e2e_env),
            (KEY_USE_URL, &self.use_predefined_url),
            (KEY_MOCK, &self.mock_server),
            (KEY_GREP, &self.grep),
            (KEY_PROJECT, &self.project),
            (KEY_TIMEOUT, &self.timeout),
            (KEY_REPEAT, &self.repeat),
            (KEY_WORKERS, &self.workers),
            (KEY_MODE, &self.mode),
            (KEY_RUNNER, &self.runner),
            (KEY_WORKDIR, &self.work_dir),
            (KEY_CANARY, &self.canary_version),
            (KEY_FFS, &self.regression_feature_flags),
            (KEY_BS_USER, &self.bs_username),
            (KEY_BS_KEY, &self.bs_access_key),
        ]
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut String); 16] {
        [
            (KEY_PLATFORM, &mut self.platform),
            (KEY_E2E_ENV, &mut self.e2e_env),
            (KEY_USE_URL, &mut self.use_predefined_url),
            (KEY_MOCK, &mut self.mock_server),
            (KEY_GREP, &mut self.grep),
            (KEY_PROJECT, &mut self.project),
            (KEY_TIMEOUT, &mut self.timeout),
            (KEY_REPEAT, &mut self.repeat),
            (KEY_WORKERS, &mut self.workers),
            (KEY_MODE, &mut self.mode),
            (KEY_RUNNER, &mut self.runner),
            (KEY_WORKDIR, &mut self.work_dir),
            (KEY_CANARY, &mut self.canary_version),
            (KEY_FFS, &mut self.regression_feature_flags),
            (KEY_BS_USER, &mut self.bs_username),
            (KEY_BS_KEY, &mut self.bs_access_key),
        ]
    }
}

fn is_choice(key: &str) -> bool {
    matches!(
        key,
        KEY_PLATFORM | KEY_E2E_ENV | KEY_USE_URL | KEY_MOCK | KEY_PROJECT | KEY_MODE | KEY_RUNNER
    )
}
