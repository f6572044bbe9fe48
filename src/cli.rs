//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::request::RunForm;

/// Top-level CLI parser for `envrunner`.
#[derive(Debug, Parser)]
#[command(name = "envrunner", version, about = "Build and run end-to-end test commands")]
pub struct Cli {
    /// Project root; relative working directories and the state file resolve against it.
    #[arg(long, global = true, value_name = "DIR")]
    pub project_root: Option<PathBuf>,
    /// Where the last-used form is stored.
    #[arg(long, global = true, value_name = "PATH")]
    pub state_file: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the effective command without running it.
    Command(RunArgs),
    /// Save the form and run the tests.
    Run(RunArgs),
    /// Serve the Playwright HTML report.
    Report {
        /// Directory holding the report, absolute or relative to the project root.
        #[arg(long, value_name = "DIR")]
        work_dir: Option<String>,
    },
    /// Inspect or clear the saved form.
    State {
        /// State operation.
        #[command(subcommand)]
        action: StateAction,
    },
}

/// `state` operations.
#[derive(Debug, Subcommand)]
pub enum StateAction {
    /// Print the saved values.
    Show,
    /// Forget the saved values.
    Reset,
}

/// Per-run overrides of the saved form.
#[derive(Debug, Default, Clone, Args)]
pub struct RunArgs {
    /// Target platform (PLA, FE, TAP, CORE_OPS, ..., PROD, XMNUP).
    #[arg(long)]
    pub platform: Option<String>,
    /// Backend environment (VI11_1, VI7_1, SFC_1, ...).
    #[arg(long)]
    pub e2e_env: Option<String>,
    /// Use the predefined environment URL (true/false).
    #[arg(long)]
    pub use_predefined_url: Option<String>,
    /// Enable the mock server (true/false).
    #[arg(long)]
    pub mock_server: Option<String>,
    /// Canary version, for example 25.9.12-rcv-136333.
    #[arg(long)]
    pub canary_version: Option<String>,
    /// Regression feature flags as JSON.
    #[arg(long = "regression-ffs", value_name = "JSON")]
    pub regression_feature_flags: Option<String>,
    /// Test-name filter; `|` separates alternatives.
    #[arg(long, allow_hyphen_values = true)]
    pub grep: Option<String>,
    /// Browser or device target.
    #[arg(long)]
    pub project: Option<String>,
    /// Per-test timeout in milliseconds.
    #[arg(long)]
    pub timeout: Option<String>,
    /// Run each test this many extra times.
    #[arg(long = "repeat-each")]
    pub repeat: Option<String>,
    /// Worker count or percentage.
    #[arg(long)]
    pub workers: Option<String>,
    /// Browser mode (headed, debug, headless).
    #[arg(long)]
    pub mode: Option<String>,
    /// Test engine (playwright, jest).
    #[arg(long)]
    pub runner: Option<String>,
    /// BrowserStack user.
    #[arg(long)]
    pub bs_username: Option<String>,
    /// BrowserStack access key.
    #[arg(long)]
    pub bs_access_key: Option<String>,
    /// Directory the tests run in.
    #[arg(long)]
    pub work_dir: Option<String>,
}

impl RunArgs {
    /// Overwrites every field of `form` given on the command line.
    pub fn apply_to(&self, form: &mut RunForm) {
        let overrides = [
            (&self.platform, &mut form.platform),
            (&self.e2e_env, &mut form.e2e_env),
            (&self.use_predefined_url, &mut form.use_predefined_url),
            (&self.mock_server, &mut form.mock_server),
            (&self.canary_version, &mut form.canary_version),
            (&self.regression_feature_flags, &mut form.regression_feature_flags),
            (&self.grep, &mut form.grep),
            (&self.project, &mut form.project),
            (&self.timeout, &mut form.timeout),
            (&self.repeat, &mut form.repeat),
            (&self.workers, &mut form.workers),
            (&self.mode, &mut form.mode),
            (&self.runner, &mut form.runner),
            (&self.bs_username, &mut form.bs_username),
            (&self.bs_access_key, &mut form.bs_access_key),
            (&self.work_dir, &mut form.work_dir),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
        form.normalize_environment();
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, RunArgs, StateAction};
    use crate::request::RunForm;
    use clap::Parser;

    #[test]
    fn parses_command_with_overrides() {
        let cli = Cli::parse_from([
            "envrunner",
            "command",
            "--platform",
            "PROD",
            "--grep",
            "RCV-7364",
            "--repeat-each",
            "2",
        ]);
        let Command::Command(args) = cli.command else {
            panic!("expected command subcommand");
        };
        assert_eq!(args.platform.as_deref(), Some("PROD"));
        assert_eq!(args.grep.as_deref(), Some("RCV-7364"));
        assert_eq!(args.repeat.as_deref(), Some("2"));
        assert_eq!(args.project, None);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["envrunner", "report", "--project-root", "/repo", "-vv"]);
        assert!(matches!(cli.command, Command::Report { work_dir: None }));
        assert_eq!(cli.project_root.as_deref(), Some(std::path::Path::new("/repo")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn parses_state_subcommands() {
        let cli = Cli::parse_from(["envrunner", "state", "reset"]);
        assert!(matches!(cli.command, Command::State { action: StateAction::Reset }));
    }

    #[test]
    fn grep_may_start_with_a_dash() {
        let cli = Cli::parse_from(["envrunner", "run", "--grep", "-smoke"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.grep.as_deref(), Some("-smoke"));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let mut form = RunForm { grep: "saved".into(), workers: "4".into(), ..RunForm::default() };
        let args = RunArgs { workers: Some("50%".into()), ..RunArgs::default() };

        args.apply_to(&mut form);

        assert_eq!(form.grep, "saved");
        assert_eq!(form.workers, "50%");
    }

    #[test]
    fn prod_override_pins_environment() {
        let mut form = RunForm::default();
        let args = RunArgs { platform: Some("PROD".into()), ..RunArgs::default() };

        args.apply_to(&mut form);

        assert_eq!(form.e2e_env, "PROD");
        assert_eq!(form.use_predefined_url, "false");
    }
}
