//! BrowserStack augmentation for device-cloud projects.

use super::token::{render, Token};
use crate::request::{DeviceCloud, RunRequest};

/// Frees the local BrowserStack tunnel port before the run starts.
pub const CLEANUP_PREFIX: &str = "yarn kill-browser-stack-port &&";

/// Renders `RUN_ID=... LOCAL_RUN=true BS_DEVICE=... PROJECT='...'`.
#[must_use]
pub fn device_block(request: &RunRequest, device: DeviceCloud, run_id: &str) -> String {
    render(&[
        Token::BareEnv { key: "RUN_ID", value: run_id },
        Token::BareEnv { key: "LOCAL_RUN", value: "true" },
        Token::BareEnv { key: "BS_DEVICE", value: device.as_str() },
        Token::Env { key: "PROJECT", value: request.project.as_str() },
    ])
}

/// Renders whichever BrowserStack credentials are present.
#[must_use]
pub fn credentials_block(request: &RunRequest) -> String {
    render(&[
        Token::OptionalEnv { key: "BROWSERSTACK_USERNAME", value: &request.bs_username },
        Token::OptionalEnv { key: "BROWSERSTACK_ACCESS_KEY", value: &request.bs_access_key },
    ])
}
