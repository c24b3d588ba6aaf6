//! Revassign CLI - wires settings, the Gerrit client and the resolver together.

pub mod args;
pub mod output;
pub mod settings;

pub use args::{Cli, LogLevel};

use anyhow::Result;
use revassign_core::{
    AddReviewersError, AdditionReport, ReviewerAdder, ReviewerResolver, exit_codes,
};
use revassign_gerrit::{GerritClient, GerritError};
use revassign_rules::RuleStore;
use tracing_subscriber::EnvFilter;

use crate::settings::{RunConfig, Settings};

/// Install the stderr log subscriber.
///
/// An explicit level wins; otherwise `RUST_LOG` is honoured, falling back to `info`.
pub fn init_logging(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.as_filter_str()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LogLevel::default().as_filter_str())),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Resolve and add reviewers for the change named on the command line.
pub async fn run(cli: &Cli) -> Result<AdditionReport> {
    let settings = Settings::discover(cli.settings.as_deref())?;
    let config = RunConfig::resolve(cli, settings)?;
    tracing::debug!(?config, "resolved configuration");

    let client = GerritClient::from_auth_file(&config.auth_file, &config.client)?;
    let resolver = ReviewerResolver::new(RuleStore::new(&config.rules_dir), config.policy);
    let adder = ReviewerAdder::new(client, resolver);

    Ok(adder.add_reviewers(cli.change, cli.force, cli.dry_run).await?)
}

/// Exit code for a failed [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<AddReviewersError>() {
        return err.exit_code();
    }
    if let Some(err) = err.downcast_ref::<GerritError>() {
        return err.exit_code();
    }
    exit_codes::RUNTIME_FAILURE
}
