#![allow(clippy::missing_errors_doc, clippy::uninlined_format_args)]
//! Revassign Core - decides who reviews a change and adds them.
//!
//! ```text
//! change number
//!      │
//!      ▼
//! ReviewServer::fetch_change ──► patchset precondition (unless forced)
//!      │
//!      ▼
//! ReviewerResolver
//!   1. exception branch / topic  → nobody
//!   2. identity table            (reviewers_email.cfg)
//!   3. global rules              (global_reviewers.cfg, branch rules only)
//!   4. project rules             (<project>.cfg or nearest ancestor)
//!   5. dedupe emails
//!      │
//!      ▼
//! ReviewServer::add_reviewer for each email (skipped in dry-run)
//! ```

mod adder;
mod change;
mod error;
mod policy;
mod resolver;

pub use adder::{AdditionReport, ReviewServer, ReviewerAdder};
pub use change::Change;
pub use error::{AddReviewersError, ServerError, exit_codes};
pub use policy::{DEFAULT_EXCEPTION_TOPIC_PATTERN, ExceptionPolicy, Exemption};
pub use resolver::{Resolution, ReviewerResolver};
