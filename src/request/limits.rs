//! Numeric run limits parsed from their string-encoded form fields.

use std::fmt;
use std::num::{NonZeroU32, NonZeroU64};
use std::str::FromStr;

use thiserror::Error;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Timeout was not a positive integer.
    #[error("Timeout > 0 (ms), got {0:?}")]
    Timeout(String),
    /// Repeat-each was not a non-negative integer.
    #[error("Repeat-each >= 0, got {0:?}")]
    RepeatEach(String),
    /// Workers was neither a positive integer nor a 1%..100% percentage.
    #[error("Workers: positive integer (e.g., 1) or percentage 1%..100% (e.g., 50%), got {0:?}")]
    Workers(String),
}

/// Per-test timeout in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout(NonZeroU64);

impl Timeout {
    /// The timeout in milliseconds.
    #[must_use]
    pub fn millis(self) -> u64 {
        self.0.get()
    }
}

impl FromStr for Timeout {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(NonZeroU64::new)
            .map(Self)
            .ok_or_else(|| ValidationError::Timeout(value.to_string()))
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many times each test is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatEach(u32);

impl RepeatEach {
    /// The repeat count.
    #[must_use]
    pub fn count(self) -> u32 {
        self.0
    }
}

impl FromStr for RepeatEach {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self).map_err(|_| ValidationError::RepeatEach(value.to_string()))
    }
}

impl fmt::Display for RepeatEach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Worker count, absolute or as a share of logical cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workers {
    /// A fixed number of workers, at least one.
    Count(NonZeroU32),
    /// A percentage of logical CPU cores, 1 to 100.
    Percent(u8),
}

impl FromStr for Workers {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::Workers(value.to_string());
        let trimmed = value.trim();

        if let Ok(count) = trimmed.parse::<u32>() {
            return NonZeroU32::new(count).map(Self::Count).ok_or_else(invalid);
        }
        let percent = trimmed
            .strip_suffix('%')
            .and_then(|digits| digits.parse::<u8>().ok())
            .filter(|p| (1..=100).contains(p))
            .ok_or_else(invalid)?;
        Ok(Self::Percent(percent))
    }
}

impl fmt::Display for Workers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}
