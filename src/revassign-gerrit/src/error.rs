use std::path::PathBuf;

use revassign_core::exit_codes;

/// Errors raised while setting up a [`crate::GerritClient`].
#[derive(Debug, thiserror::Error)]
pub enum GerritError {
    #[error("found no Gerrit auth config file: {}", .0.display())]
    AuthConfigMissing(PathBuf),

    #[error("cannot determine the home directory for the Gerrit auth config file")]
    NoHomeDir,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid Gerrit auth config {}: {source}", path.display())]
    InvalidAuthConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl GerritError {
    /// Exit code the process should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthConfigMissing(_) | Self::NoHomeDir => exit_codes::AUTH_CONFIG_MISSING,
            _ => exit_codes::RUNTIME_FAILURE,
        }
    }
}

/// Result type for Gerrit client setup.
pub type Result<T> = std::result::Result<T, GerritError>;
