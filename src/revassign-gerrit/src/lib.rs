//! Gerrit REST client for revassign.
//!
//! Implements [`revassign_core::ReviewServer`] on top of Gerrit's REST API:
//! one change query (current revision and files) and one reviewer addition
//! per call. Credentials come from a small JSON auth file.

mod auth;
mod client;
mod error;
mod models;

pub use auth::{AuthConfig, default_auth_file};
pub use client::{ClientOptions, GerritClient};
pub use error::{GerritError, Result};

/// Auth file location relative to the home directory.
pub const DEFAULT_AUTH_FILE: &str = ".gerrit/grcauth.json";

/// Prefix Gerrit puts in front of every JSON body to defeat XSSI.
pub const XSSI_PREFIX: &str = ")]}'";
