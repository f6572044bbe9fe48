//! Effective command construction.
//!
//! Turns a [`RunRequest`] into one shell command line for `/bin/sh -c`:
//!
//! ```text
//! [yarn kill-browser-stack-port && RUN_ID=.. LOCAL_RUN=true BS_DEVICE=.. PROJECT=.. [credentials]]
//! PLATFORM=.. E2E_ENV=.. USE_PREDEFINED_ENV_URL=.. MOCK_SERVER=.. CI=.. RCV_CANARY_VERSION=.. RWC_REGRESSION_FFS=..
//! yarn test <runner arguments>
//! ```
//!
//! Values are passed through without validation; callers validate first.

pub mod device_cloud;
pub mod env;
pub mod quote;
pub mod runner;
pub mod token;

use crate::ports::IdGenerator;
use crate::request::RunRequest;

pub use quote::sh_quote;

/// Builds the effective command for `request`.
///
/// `ids` is consulted only for device-cloud projects, which get a fresh
/// `RUN_ID`. For every other project the output depends on `request` alone.
#[must_use]
pub fn build(request: &RunRequest, ids: &dyn IdGenerator) -> String {
    let env = env::block(request);
    let base = runner::base_command(request);

    match request.project.device_cloud() {
        Some(device) => {
            let run_id = ids.generate_id();
            token::join_nonblank([
                device_cloud::CLEANUP_PREFIX.to_string(),
                device_cloud::device_block(request, device, &run_id),
                device_cloud::credentials_block(request),
                env,
                base,
            ])
        }
        None => format!("{env} {base}").trim().to_string(),
    }
}
