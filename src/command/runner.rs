//! Runner-specific argument mapping.

use super::token::{render, Token};
use crate::request::{Mode, RunRequest};

const INVOCATION: &str = "yarn test";

/// Builds the runner invocation: Jest when requested, Playwright otherwise.
#[must_use]
pub fn base_command(request: &RunRequest) -> String {
    if request.runner.is_jest() {
        render(&jest_tokens(request))
    } else {
        render(&playwright_tokens(request))
    }
}

/// Playwright arguments. Retries stay off; reruns are the runner's concern.
#[must_use]
pub fn playwright_tokens(request: &RunRequest) -> Vec<Token<'_>> {
    let mode = match request.mode.canonical() {
        Mode::Headed => "--headed",
        Mode::Debug => "--debug",
        Mode::Headless | Mode::Unrecognized(_) => "",
    };
    vec![
        Token::Literal(INVOCATION),
        Token::Filter { flag: None, text: &request.grep },
        Token::QuotedFlag { name: "--project", value: request.project.as_str() },
        Token::Flag { name: "--timeout", value: &request.timeout },
        Token::Literal("--reporter=html"),
        Token::Literal("--trace=on"),
        Token::Literal("--retries=0"),
        Token::Flag { name: "--repeat-each", value: &request.repeat },
        Token::Flag { name: "--workers", value: &request.workers },
        Token::Literal(mode),
    ]
}

/// Jest arguments. Tests run serially; there is no worker or repeat mapping.
#[must_use]
pub fn jest_tokens(request: &RunRequest) -> Vec<Token<'_>> {
    vec![
        Token::Literal(INVOCATION),
        Token::Filter { flag: Some("-t"), text: &request.grep },
        Token::Flag { name: "--testTimeout", value: &request.timeout },
        Token::Literal("--runInBand"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Runner;

    #[test]
    fn playwright_full_argument_order() {
        let request = RunRequest {
            grep: "RCV-7364".into(),
            workers: "50%".into(),
            repeat: "3".into(),
            mode: Mode::Debug,
            ..RunRequest::default()
        };

        assert_eq!(
            base_command(&request),
            "yarn test \"RCV-7364\" --project='chrome' --timeout=280000 --reporter=html \
             --trace=on --retries=0 --repeat-each=3 --workers=50% --debug"
        );
    }

    #[test]
    fn playwright_omits_blank_grep_and_headless_mode() {
        let request =
            RunRequest { grep: "   ".into(), mode: Mode::Headless, ..RunRequest::default() };

        let command = base_command(&request);

        assert!(command.starts_with("yarn test --project='chrome'"));
        assert!(command.ends_with("--workers=1"));
    }

    #[test]
    fn jest_maps_grep_and_timeout() {
        let request = RunRequest {
            runner: Runner::Jest,
            grep: "A|B".into(),
            timeout: "5000".into(),
            ..RunRequest::default()
        };

        assert_eq!(base_command(&request), "yarn test -t \"A|B\" --testTimeout=5000 --runInBand");
    }

    #[test]
    fn jest_without_grep() {
        let request = RunRequest { runner: Runner::Jest, ..RunRequest::default() };

        assert_eq!(base_command(&request), "yarn test --testTimeout=280000 --runInBand");
    }

    #[test]
    fn unrecognized_runner_uses_playwright() {
        let request =
            RunRequest { runner: Runner::Unrecognized("vitest".into()), ..RunRequest::default() };

        assert!(base_command(&request).contains("--reporter=html"));
    }
}
