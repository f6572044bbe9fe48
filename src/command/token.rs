//! Structured command tokens rendered to shell text as the last step.

use super::quote::{double_quote, sh_quote};

/// One piece of a generated command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Emitted verbatim.
    Literal(&'a str),
    /// `--name=value` with the value unquoted.
    Flag {
        /// Flag name including dashes.
        name: &'static str,
        /// Raw value.
        value: &'a str,
    },
    /// `--name='value'` with the value single-quoted.
    QuotedFlag {
        /// Flag name including dashes.
        name: &'static str,
        /// Value to quote.
        value: &'a str,
    },
    /// A double-quoted word, optionally preceded by a short flag. Dropped
    /// entirely when the text is blank.
    Filter {
        /// Flag placed before the quoted word, such as `-t`.
        flag: Option<&'static str>,
        /// Filter text.
        text: &'a str,
    },
    /// `KEY='value'`.
    Env {
        /// Variable name.
        key: &'static str,
        /// Value to quote.
        value: &'a str,
    },
    /// `KEY='value'`, dropped entirely when the value is blank.
    OptionalEnv {
        /// Variable name.
        key: &'static str,
        /// Value to quote.
        value: &'a str,
    },
    /// `KEY=value` for values known to be shell-safe.
    BareEnv {
        /// Variable name.
        key: &'static str,
        /// Value emitted as-is.
        value: &'a str,
    },
}

impl Token<'_> {
    /// Renders the token; blank results are skipped by [`render`].
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Literal(text) => (*text).to_string(),
            Self::Flag { name, value } => format!("{name}={value}"),
            Self::QuotedFlag { name, value } => format!("{name}={}", sh_quote(value)),
            Self::Filter { text, .. } if is_blank(text) => String::new(),
            Self::Filter { flag: Some(flag), text } => format!("{flag} {}", double_quote(text)),
            Self::Filter { flag: None, text } => double_quote(text),
            Self::OptionalEnv { value, .. } if is_blank(value) => String::new(),
            Self::Env { key, value } | Self::OptionalEnv { key, value } => {
                format!("{key}={}", sh_quote(value))
            }
            Self::BareEnv { key, value } => format!("{key}={value}"),
        }
    }
}

/// Renders tokens in order, dropping blank ones, separated by single spaces.
#[must_use]
pub fn render(tokens: &[Token<'_>]) -> String {
    join_nonblank(tokens.iter().map(Token::render))
}

/// Joins non-blank segments with single spaces and trims the result.
pub(crate) fn join_nonblank<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if is_blank(segment) {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(segment);
    }
    joined.trim().to_string()
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_token_kind_renders() {
        assert_eq!(Token::Literal("yarn test").render(), "yarn test");
        assert_eq!(Token::Flag { name: "--workers", value: "50%" }.render(), "--workers=50%");
        assert_eq!(
            Token::QuotedFlag { name: "--project", value: "chrome" }.render(),
            "--project='chrome'"
        );
        assert_eq!(Token::Filter { flag: Some("-t"), text: "A|B" }.render(), r#"-t "A|B""#);
        assert_eq!(Token::Env { key: "CI", value: "true" }.render(), "CI='true'");
        assert_eq!(Token::BareEnv { key: "LOCAL_RUN", value: "true" }.render(), "LOCAL_RUN=true");
    }

    #[test]
    fn blank_optional_tokens_vanish() {
        assert_eq!(Token::Filter { flag: None, text: "  " }.render(), "");
        assert_eq!(Token::OptionalEnv { key: "SECRET", value: "" }.render(), "");
        assert_eq!(Token::Env { key: "EMPTY", value: "" }.render(), "EMPTY=''");
    }

    #[test]
    fn render_skips_blank_tokens() {
        let tokens = [
            Token::Literal("yarn test"),
            Token::Filter { flag: None, text: "" },
            Token::Literal(""),
            Token::Flag { name: "--timeout", value: "1" },
        ];
        assert_eq!(render(&tokens), "yarn test --timeout=1");
    }
}
