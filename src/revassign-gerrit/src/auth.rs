//! Gerrit credentials file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{DEFAULT_AUTH_FILE, GerritError, Result};

/// Contents of the auth file: server URL plus optional HTTP credentials.
#[derive(Deserialize)]
pub struct AuthConfig {
    /// Canonical web URL of the Gerrit server.
    #[serde(rename = "canonicalurl")]
    pub canonical_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("canonical_url", &self.canonical_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    /// Reads and decodes `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::error!(path = %path.display(), "found no Gerrit auth config file");
            return Err(GerritError::AuthConfigMissing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| GerritError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| GerritError::InvalidAuthConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Credentials usable for authenticated access, if both parts are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((username, password))
    }
}

/// `~/.gerrit/grcauth.json`.
pub fn default_auth_file() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_AUTH_FILE))
        .ok_or(GerritError::NoHomeDir)
}
