//! Gerrit REST client implementation

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use revassign_core::{Change, ReviewServer, ServerError};
use secrecy::{ExposeSecret, SecretString};

use crate::models::ChangeInfo;
use crate::{AuthConfig, Result, XSSI_PREFIX};

/// Status codes Gerrit uses for a successful REST call.
const VALID_STATUS_CODES: [StatusCode; 2] = [StatusCode::OK, StatusCode::NO_CONTENT];

/// Change query options: current revision with its file list.
const CHANGE_QUERY_OPTIONS: [&str; 2] = ["CURRENT_REVISION", "CURRENT_FILES"];

/// Transport settings for [`GerritClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Skip TLS certificate verification (self-signed internal servers).
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for one Gerrit server.
pub struct GerritClient {
    client: reqwest::Client,
    server_url: String,
    api_url: String,
    credentials: Option<(String, SecretString)>,
}

impl GerritClient {
    /// Create a client from a decoded auth config.
    ///
    /// With credentials, requests go through the authenticated `/a` prefix.
    pub fn new(config: &AuthConfig, options: &ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()?;

        let server_url = config.canonical_url.trim_end_matches('/').to_string();
        let (api_url, credentials) = match config.credentials() {
            Some((user, password)) => (
                format!("{server_url}/a"),
                Some((user.to_string(), SecretString::from(password.to_string()))),
            ),
            None => (server_url.clone(), None),
        };

        Ok(Self {
            client,
            server_url,
            api_url,
            credentials,
        })
    }

    /// Create a client from the auth file at `path`.
    pub fn from_auth_file(path: &Path, options: &ClientOptions) -> Result<Self> {
        let config = AuthConfig::load(path)?;
        Self::new(&config, options)
    }

    /// Create an anonymous client (for testing)
    #[cfg(test)]
    pub(crate) fn from_host_root(host_root: impl Into<String>) -> Self {
        let server_url: String = host_root.into();
        Self {
            client: reqwest::Client::new(),
            api_url: server_url.clone(),
            server_url,
            credentials: None,
        }
    }

    fn request(&self, method: Method, endpoint: &str) -> reqwest::RequestBuilder {
        tracing::info!(%method, endpoint, "request");
        let builder = self
            .client
            .request(method, format!("{}{}", self.api_url, endpoint));
        match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, Some(password.expose_secret())),
            None => builder,
        }
    }

    /// Send a request; returns the body on a valid status, or the status and body otherwise.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<String, ServerError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;
        let status = response.status();
        tracing::info!(status = status.as_u16(), "response");

        let body = response
            .text()
            .await
            .map_err(|e| ServerError::Transport(e.to_string()))?;
        if !VALID_STATUS_CODES.contains(&status) {
            tracing::error!(status = status.as_u16(), %body, "unexpected response");
            return Err(ServerError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Strip Gerrit's XSSI guard line from a JSON body.
pub(crate) fn strip_xssi(body: &str) -> &str {
    let trimmed = body.trim_start();
    trimmed.strip_prefix(XSSI_PREFIX).unwrap_or(trimmed)
}

/// Flatten a queried change into the fields reviewer assignment uses.
fn into_change(change_number: u64, info: ChangeInfo) -> std::result::Result<Change, ServerError> {
    let ChangeInfo {
        project,
        branch,
        topic,
        current_revision,
        mut revisions,
    } = info;
    let revision = revisions.remove(&current_revision).ok_or_else(|| {
        ServerError::InvalidResponse(format!(
            "current revision {current_revision} missing from change {change_number}"
        ))
    })?;

    let mut files = Vec::with_capacity(revision.files.len());
    for (path, file) in revision.files {
        files.push(path);
        if let Some(old_path) = file.old_path {
            files.push(old_path);
        }
    }

    Ok(Change {
        project,
        branch,
        change_number,
        patchset_number: revision.number,
        topic,
        files,
    })
}

#[async_trait]
impl ReviewServer for GerritClient {
    async fn fetch_change(&self, change_number: u64) -> std::result::Result<Change, ServerError> {
        let mut query = vec![("q", change_number.to_string())];
        query.extend(CHANGE_QUERY_OPTIONS.iter().map(|o| ("o", o.to_string())));
        let request = self.request(Method::GET, "/changes/").query(&query);

        let body = match self.send(request).await {
            Ok(body) => body,
            Err(ServerError::Status { .. }) => {
                tracing::error!(change = change_number, "found no Gerrit change");
                return Err(ServerError::ChangeNotFound(change_number));
            }
            Err(e) => return Err(e),
        };

        let changes: Vec<ChangeInfo> = serde_json::from_str(strip_xssi(&body))
            .map_err(|e| ServerError::InvalidResponse(e.to_string()))?;
        let Some(info) = changes.into_iter().next() else {
            tracing::error!(change = change_number, "found no Gerrit change");
            return Err(ServerError::ChangeNotFound(change_number));
        };

        let change = into_change(change_number, info)?;
        tracing::info!(
            change = change_number,
            project = %change.project,
            branch = %change.branch,
            patchset = change.patchset_number,
            files = change.files.len(),
            "current patchset of change"
        );
        Ok(change)
    }

    async fn add_reviewer(
        &self,
        change_number: u64,
        email: &str,
    ) -> std::result::Result<(), ServerError> {
        let request = self
            .request(Method::POST, &format!("/changes/{change_number}/reviewers"))
            .json(&serde_json::json!({ "reviewer": email }));
        self.send(request).await.map(|_| ())
    }

    fn server_url(&self) -> &str {
        &self.server_url
    }
}
