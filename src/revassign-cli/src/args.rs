//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Exit status table printed after `--help`.
const EXIT_CODES_HELP: &str = "\
Exit codes:
  0  reviewers added, or nothing to add
  1  auth file missing
  2  current patchset is not the first one (also used for usage errors)
  3  change not found
  4  some reviewers could not be added
  5  any other failure";

/// Add reviewers to a Gerrit change according to the reviewer rule files.
#[derive(Debug, Parser)]
#[command(name = "revassign", version, about, long_about = None, after_help = EXIT_CODES_HELP)]
pub struct Cli {
    /// Gerrit change number
    #[arg(
        long = "change",
        visible_alias = "gerrit-change-number",
        env = "REVASSIGN_CHANGE",
        value_name = "N"
    )]
    pub change: u64,

    /// Add reviewers regardless of the current patchset number
    #[arg(short, long)]
    pub force: bool,

    /// Resolve reviewers and log them without adding anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log verbosity (defaults to RUST_LOG, then info)
    #[arg(long, value_enum, ignore_case = true, env = "REVASSIGN_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Directory holding the reviewer rule files
    #[arg(long, env = "REVASSIGN_RULES_DIR", value_name = "DIR")]
    pub rules_dir: Option<PathBuf>,

    /// Gerrit auth file (defaults to ~/.gerrit/grcauth.json)
    #[arg(long, env = "REVASSIGN_AUTH_FILE", value_name = "FILE")]
    pub auth_file: Option<PathBuf>,

    /// Settings file (defaults to <config dir>/revassign/config.toml)
    #[arg(long, env = "REVASSIGN_SETTINGS", value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors
    #[value(alias = "warning")]
    Warn,
    /// Show informational messages, warnings, and errors (default)
    #[default]
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "revassign",
            "--gerrit-change-number",
            "42",
            "-f",
            "-n",
            "--log-level",
            "WARNING",
        ])
        .unwrap();
        assert_eq!(cli.change, 42);
        assert!(cli.force);
        assert!(cli.dry_run);
        assert!(!cli.json);
        assert_eq!(cli.log_level, Some(LogLevel::Warn));
    }

    #[test]
    fn test_change_is_required() {
        assert!(Cli::try_parse_from(["revassign"]).is_err());
        assert!(Cli::try_parse_from(["revassign", "--change", "abc"]).is_err());
    }
}
