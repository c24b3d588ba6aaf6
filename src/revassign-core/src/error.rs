//! Error types for talking to the review server and adding reviewers.

use thiserror::Error;

/// Process exit codes, one per fatal condition.
pub mod exit_codes {
    /// Reviewers were added (or nothing needed adding).
    pub const SUCCESS: i32 = 0;
    /// The server credentials file is missing.
    pub const AUTH_CONFIG_MISSING: i32 = 1;
    /// The current patchset is not the first one and `--force` was not given.
    ///
    /// Shared with clap, which exits with 2 on command-line usage errors.
    pub const UNDESIRABLE_PATCHSET: i32 = 2;
    /// The server reported no such change.
    pub const CHANGE_NOT_FOUND: i32 = 3;
    /// At least one reviewer could not be added.
    pub const REVIEWERS_NOT_ALL_ADDED: i32 = 4;
    /// Any other failure (settings, transport, malformed responses).
    pub const RUNTIME_FAILURE: i32 = 5;
}

/// Errors reported by a [`crate::ReviewServer`].
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server has no change with that number.
    #[error("found no change: {0}")]
    ChangeNotFound(u64),

    /// The server answered with an unexpected status.
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be sent or the response not read.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Fatal outcomes of [`crate::ReviewerAdder::add_reviewers`].
#[derive(Debug, Error)]
pub enum AddReviewersError {
    /// Normal mode only handles the first patchset of a change.
    #[error("no reviewers will be added for patchset {patchset} of change {change_number}")]
    UndesirablePatchset { change_number: u64, patchset: u32 },

    /// The change does not exist on the server.
    #[error("found no change: {0}")]
    ChangeNotFound(u64),

    /// Some reviewers were rejected; the others were still attempted.
    #[error("failed to add reviewers to change {change_number}: {}", failed.join(", "))]
    PartialAddition {
        change_number: u64,
        added: Vec<String>,
        failed: Vec<String>,
    },

    /// Any other server failure while fetching the change.
    #[error(transparent)]
    Server(ServerError),
}

impl AddReviewersError {
    /// Exit code the process should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UndesirablePatchset { .. } => exit_codes::UNDESIRABLE_PATCHSET,
            Self::ChangeNotFound(_) => exit_codes::CHANGE_NOT_FOUND,
            Self::PartialAddition { .. } => exit_codes::REVIEWERS_NOT_ALL_ADDED,
            Self::Server(_) => exit_codes::RUNTIME_FAILURE,
        }
    }
}

impl From<ServerError> for AddReviewersError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::ChangeNotFound(n) => Self::ChangeNotFound(n),
            other => Self::Server(other),
        }
    }
}
