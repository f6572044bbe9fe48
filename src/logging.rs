//! Diagnostic logging on stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "ENVRUNNER_LOG";

/// Filter directive for a `-v` count when `ENVRUNNER_LOG` is unset.
#[must_use]
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "envrunner=info",
        1 => "envrunner=debug",
        _ => "envrunner=trace",
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_directive(0), "envrunner=info");
        assert_eq!(default_directive(1), "envrunner=debug");
        assert_eq!(default_directive(5), "envrunner=trace");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(0);
        init(2);
    }
}
