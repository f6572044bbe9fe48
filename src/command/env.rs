//! Environment-variable derivation for the test scripts.

use super::token::{render, Token};
use crate::request::{Platform, RunRequest};

/// Environment values after platform rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedEnv<'a> {
    /// Value for `E2E_ENV`.
    pub e2e_env: &'a str,
    /// Value for `USE_PREDEFINED_ENV_URL`.
    pub use_predefined_url: &'a str,
}

/// Applies the platform rules: `PROD` always runs against the `PROD`
/// environment without the predefined URL.
#[must_use]
pub fn derive(request: &RunRequest) -> DerivedEnv<'_> {
    if request.platform.canonical() == Platform::Prod {
        DerivedEnv { e2e_env: "PROD", use_predefined_url: "false" }
    } else {
        DerivedEnv {
            e2e_env: request.e2e_env.as_str(),
            use_predefined_url: &request.use_predefined_url,
        }
    }
}

/// The seven exported assignments, in their fixed order.
#[must_use]
pub fn tokens(request: &RunRequest) -> [Token<'_>; 7] {
    let derived = derive(request);
    [
        Token::Env { key: "PLATFORM", value: request.platform.as_str() },
        Token::Env { key: "E2E_ENV", value: derived.e2e_env },
        Token::Env { key: "USE_PREDEFINED_ENV_URL", value: derived.use_predefined_url },
        Token::Env { key: "MOCK_SERVER", value: &request.mock_server },
        Token::Env { key: "CI", value: &request.ci },
        Token::Env { key: "RCV_CANARY_VERSION", value: &request.canary_version },
        Token::Env { key: "RWC_REGRESSION_FFS", value: &request.regression_feature_flags },
    ]
}

/// Renders the environment prefix, for example `PLATFORM='PLA' E2E_ENV='VI11_1' ...`.
#[must_use]
pub fn block(request: &RunRequest) -> String {
    render(&tokens(request))
}
