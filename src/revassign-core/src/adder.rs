//! Change orchestration: fetch, check, resolve, add.

use async_trait::async_trait;
use serde::Serialize;

use crate::change::Change;
use crate::error::{AddReviewersError, ServerError};
use crate::policy::Exemption;
use crate::resolver::ReviewerResolver;

/// Operations the orchestrator needs from the review server.
#[async_trait]
pub trait ReviewServer: Send + Sync {
    /// Fetch the current state of a change.
    async fn fetch_change(&self, change_number: u64) -> Result<Change, ServerError>;

    /// Add `email` as a reviewer of the change.
    async fn add_reviewer(&self, change_number: u64, email: &str) -> Result<(), ServerError>;

    /// Base URL of the server, for diagnostics.
    fn server_url(&self) -> &str;
}

/// What happened to a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdditionReport {
    pub change_number: u64,
    pub project: String,
    pub branch: String,
    pub patchset: u32,
    /// Every reviewer the rules selected.
    pub reviewers: Vec<String>,
    /// Reviewers the server accepted; empty in dry-run mode.
    pub added: Vec<String>,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemption: Option<Exemption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_rules: Option<String>,
}

/// Drives reviewer assignment for one change.
pub struct ReviewerAdder<S> {
    server: S,
    resolver: ReviewerResolver,
}

impl<S: ReviewServer> ReviewerAdder<S> {
    /// Creates an adder talking to `server`.
    pub fn new(server: S, resolver: ReviewerResolver) -> Self {
        Self { server, resolver }
    }

    /// The underlying server.
    pub fn server(&self) -> &S {
        &self.server
    }

    /// Resolve and add reviewers for `change_number`.
    ///
    /// Without `force` only the first patchset is handled. In `dry_run` mode
    /// nothing is sent to the server. Every reviewer is attempted even after
    /// a failure; any failure makes the whole call fail.
    pub async fn add_reviewers(
        &self,
        change_number: u64,
        force: bool,
        dry_run: bool,
    ) -> Result<AdditionReport, AddReviewersError> {
        let change = self.server.fetch_change(change_number).await.map_err(|e| {
            tracing::error!(change = change_number, error = %e, "cannot fetch change");
            AddReviewersError::from(e)
        })?;

        if !force && change.patchset_number != 1 {
            tracing::error!(
                change = change_number,
                patchset = change.patchset_number,
                "under normal mode, no reviewers will be added for this patchset"
            );
            return Err(AddReviewersError::UndesirablePatchset {
                change_number,
                patchset: change.patchset_number,
            });
        }

        let resolution = self.resolver.resolve_change(&change);
        if resolution.exemption.is_none() && resolution.project_rules.is_none() {
            tracing::warn!(
                url = %format!("{}/{}", self.server.server_url(), change_number),
                "no project reviewers will be added for change"
            );
        }

        let mut added = Vec::new();
        let mut failed = Vec::new();
        for reviewer in &resolution.reviewers {
            if dry_run {
                tracing::info!(%reviewer, "<DRY_RUN> add reviewer");
                continue;
            }
            tracing::info!(%reviewer, "add reviewer");
            match self.server.add_reviewer(change_number, reviewer).await {
                Ok(()) => added.push(reviewer.clone()),
                Err(e) => {
                    tracing::error!(%reviewer, error = %e, "fail to add reviewer");
                    failed.push(reviewer.clone());
                }
            }
        }

        if !failed.is_empty() {
            return Err(AddReviewersError::PartialAddition {
                change_number,
                added,
                failed,
            });
        }

        Ok(AdditionReport {
            change_number,
            project: change.project,
            branch: change.branch,
            patchset: change.patchset_number,
            reviewers: resolution.reviewers,
            added,
            dry_run,
            exemption: resolution.exemption,
            project_rules: resolution.project_rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use revassign_rules::{GLOBAL_RULES_FILE, IDENTITY_FILE, RuleStore};
    use tempfile::TempDir;

    use super::*;
    use crate::error::exit_codes;
    use crate::policy::ExceptionPolicy;

    struct FakeServer {
        change: Option<Change>,
        rejected: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeServer {
        fn with_patchset(patchset_number: u32) -> Self {
            Self {
                change: Some(Change {
                    project: "platform/build".to_string(),
                    branch: "main".to_string(),
                    change_number: 42,
                    patchset_number,
                    topic: None,
                    files: vec!["core/lib.rs".to_string()],
                }),
                rejected: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReviewServer for FakeServer {
        async fn fetch_change(&self, change_number: u64) -> Result<Change, ServerError> {
            self.change
                .clone()
                .ok_or(ServerError::ChangeNotFound(change_number))
        }

        async fn add_reviewer(&self, _change_number: u64, email: &str) -> Result<(), ServerError> {
            self.calls.lock().unwrap().push(email.to_string());
            if self.rejected.iter().any(|r| r == email) {
                return Err(ServerError::Status {
                    status: 400,
                    body: "rejected".to_string(),
                });
            }
            Ok(())
        }

        fn server_url(&self) -> &str {
            "https://review.example.com"
        }
    }

    fn rules_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(IDENTITY_FILE),
            "[Reviewers Email]\nalice = alice@example.com\nbob = bob@example.com\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(GLOBAL_RULES_FILE),
            "[filter \"branch:main\"]\nreviewers = alice\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("platform.cfg"),
            "[filter \"file:core/\"]\nreviewers = bob\n",
        )
        .unwrap();
        dir
    }

    fn adder(dir: &TempDir, server: FakeServer) -> ReviewerAdder<FakeServer> {
        let resolver =
            ReviewerResolver::new(RuleStore::new(dir.path()), ExceptionPolicy::default());
        ReviewerAdder::new(server, resolver)
    }

    #[tokio::test]
    async fn test_adds_all_resolved_reviewers() {
        let dir = rules_dir();
        let adder = adder(&dir, FakeServer::with_patchset(1));
        let report = adder.add_reviewers(42, false, false).await.unwrap();
        assert_eq!(
            report.reviewers,
            vec!["alice@example.com".to_string(), "bob@example.com".to_string()]
        );
        assert_eq!(report.added, report.reviewers);
        assert_eq!(report.project_rules.as_deref(), Some("platform.cfg"));
        assert_eq!(adder.server().calls(), report.reviewers);
    }

    #[tokio::test]
    async fn test_later_patchset_is_rejected_without_force() {
        let dir = rules_dir();
        let adder = adder(&dir, FakeServer::with_patchset(2));
        let err = adder.add_reviewers(42, false, false).await.unwrap_err();
        assert!(matches!(
            err,
            AddReviewersError::UndesirablePatchset {
                change_number: 42,
                patchset: 2
            }
        ));
        assert_eq!(err.exit_code(), exit_codes::UNDESIRABLE_PATCHSET);
        assert!(adder.server().calls().is_empty());
    }

    #[tokio::test]
    async fn test_force_accepts_later_patchset() {
        let dir = rules_dir();
        let adder = adder(&dir, FakeServer::with_patchset(3));
        let report = adder.add_reviewers(42, true, false).await.unwrap();
        assert_eq!(report.patchset, 3);
        assert_eq!(report.added.len(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_calls() {
        let dir = rules_dir();
        let adder = adder(&dir, FakeServer::with_patchset(1));
        let report = adder.add_reviewers(42, false, true).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.reviewers.len(), 2);
        assert!(report.added.is_empty());
        assert!(adder.server().calls().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_attempts_everyone() {
        let dir = rules_dir();
        let mut server = FakeServer::with_patchset(1);
        server.rejected = vec!["alice@example.com".to_string()];
        let adder = adder(&dir, server);

        let err = adder.add_reviewers(42, false, false).await.unwrap_err();
        match &err {
            AddReviewersError::PartialAddition { added, failed, .. } => {
                assert_eq!(failed, &vec!["alice@example.com".to_string()]);
                assert_eq!(added, &vec!["bob@example.com".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.exit_code(), exit_codes::REVIEWERS_NOT_ALL_ADDED);
        assert_eq!(adder.server().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_change() {
        let dir = rules_dir();
        let mut server = FakeServer::with_patchset(1);
        server.change = None;
        let adder = adder(&dir, server);
        let err = adder.add_reviewers(99, false, false).await.unwrap_err();
        assert!(matches!(err, AddReviewersError::ChangeNotFound(99)));
        assert_eq!(err.exit_code(), exit_codes::CHANGE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let dir = rules_dir();
        let adder = adder(&dir, FakeServer::with_patchset(1));
        let report = adder.add_reviewers(42, false, true).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["change_number"], 42);
        assert_eq!(json["dry_run"], true);
        assert!(json.get("exemption").is_none());
    }
}
