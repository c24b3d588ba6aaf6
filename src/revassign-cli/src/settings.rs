//! Settings file loading and option precedence.
//!
//! Every value resolves as: command-line flag (or its `REVASSIGN_*`
//! environment variable) > settings file > built-in default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use revassign_core::ExceptionPolicy;
use revassign_gerrit::ClientOptions;
use serde::Deserialize;

use crate::args::Cli;

/// Directory name of the rule files when nothing else is configured.
pub const DEFAULT_RULES_DIR_NAME: &str = "reviewer-config";

/// Settings file location below the user config directory.
const SETTINGS_FILE: &str = "revassign/config.toml";

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Rule file directory.
    pub rules_dir: Option<PathBuf>,
    /// Branches that never get reviewers assigned.
    pub exception_branches: Option<Vec<String>>,
    /// Topic regex for changes that never get reviewers assigned; empty disables it.
    pub exception_topic_pattern: Option<String>,
    #[serde(default)]
    pub server: ServerSettings,
}

/// `[server]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    pub auth_file: Option<PathBuf>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid settings")
    }

    /// Load `path`, which must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load the explicit settings file, or the default one when it exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_settings_file() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/revassign/config.toml`, if a config dir is known.
pub fn default_settings_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

/// `reviewer-config` next to the running executable.
fn default_rules_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    let dir = exe
        .parent()
        .context("executable path has no parent directory")?;
    Ok(dir.join(DEFAULT_RULES_DIR_NAME))
}

/// Fully resolved options for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub rules_dir: PathBuf,
    pub auth_file: PathBuf,
    pub policy: ExceptionPolicy,
    pub client: ClientOptions,
}

impl RunConfig {
    /// Merge command-line options over `settings`.
    pub fn resolve(cli: &Cli, settings: Settings) -> Result<Self> {
        let rules_dir = match cli.rules_dir.clone().or(settings.rules_dir) {
            Some(dir) => dir,
            None => default_rules_dir()?,
        };

        let auth_file = match cli.auth_file.clone().or(settings.server.auth_file) {
            Some(path) => path,
            None => revassign_gerrit::default_auth_file()?,
        };

        let defaults = ExceptionPolicy::default();
        let branches = settings
            .exception_branches
            .unwrap_or_else(|| defaults.branches().to_vec());
        let policy = match settings.exception_topic_pattern.as_deref() {
            None => ExceptionPolicy::new(
                branches,
                Some(revassign_core::DEFAULT_EXCEPTION_TOPIC_PATTERN),
            ),
            Some("") => ExceptionPolicy::new(branches, None),
            Some(pattern) => ExceptionPolicy::new(branches, Some(pattern)),
        }
        .context("invalid exception_topic_pattern")?;

        let mut client = ClientOptions {
            accept_invalid_certs: settings.server.accept_invalid_certs,
            ..ClientOptions::default()
        };
        if let Some(secs) = settings.server.timeout_secs {
            client.timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            rules_dir,
            auth_file,
            policy,
            client,
        })
    }
}
