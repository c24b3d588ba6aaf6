//! Reviewer resolution for a single change.
//!
//! Global rules and project rules are unioned: a reviewer picked by either
//! pass is added. Project rules come from the project's own file or, when it
//! has none, from the nearest ancestor path that does.

use indexmap::IndexSet;
use revassign_rules::{
    FilterExpr, FilterRule, GLOBAL_RULES_FILE, IDENTITY_FILE, IdentityTable, RuleFile, RuleStore,
    ancestor_rules_files, project_rules_file,
};
use serde::Serialize;

use crate::change::Change;
use crate::policy::{ExceptionPolicy, Exemption};

/// Outcome of resolving one change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Reviewer emails, deduplicated, in first-seen order.
    pub reviewers: Vec<String>,
    /// Set when the change was skipped by the exception policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemption: Option<Exemption>,
    /// Project rule file that was applied, if one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_rules: Option<String>,
}

impl Resolution {
    fn exempt(exemption: Exemption) -> Self {
        Self {
            exemption: Some(exemption),
            ..Self::default()
        }
    }
}

/// Resolves reviewer emails from the rule files of a configuration directory.
#[derive(Debug, Clone)]
pub struct ReviewerResolver {
    store: RuleStore,
    policy: ExceptionPolicy,
}

impl ReviewerResolver {
    /// Creates a resolver over `store` with the given exception policy.
    pub fn new(store: RuleStore, policy: ExceptionPolicy) -> Self {
        Self { store, policy }
    }

    /// Reviewer emails for a change described field by field.
    pub fn resolve(
        &self,
        project: &str,
        branch: &str,
        change_number: u64,
        files: &[String],
        topic: Option<&str>,
    ) -> Vec<String> {
        self.resolve_parts(project, branch, change_number, files, topic)
            .reviewers
    }

    /// Full resolution for a fetched change.
    pub fn resolve_change(&self, change: &Change) -> Resolution {
        self.resolve_parts(
            &change.project,
            &change.branch,
            change.change_number,
            &change.files,
            change.topic.as_deref(),
        )
    }

    fn resolve_parts(
        &self,
        project: &str,
        branch: &str,
        change_number: u64,
        files: &[String],
        topic: Option<&str>,
    ) -> Resolution {
        let span = tracing::info_span!("resolve", change = change_number, project);
        let _enter = span.enter();

        if let Some(exemption) = self.policy.exemption(branch, topic) {
            match &exemption {
                Exemption::Branch(b) => {
                    tracing::info!(branch = %b, "skip adding reviewers for exception branch")
                }
                Exemption::Topic(t) => {
                    tracing::info!(topic = %t, "skip adding reviewers for exception topic")
                }
            }
            return Resolution::exempt(exemption);
        }

        tracing::info!(rules_dir = %self.store.root().display(), "resolving reviewers");

        let Some(identities) = self.load_identities() else {
            return Resolution::default();
        };
        tracing::debug!(entries = identities.len(), "loaded reviewer identities");

        let mut emails = IndexSet::new();

        if let Some(global) = self.load_logged(GLOBAL_RULES_FILE) {
            self.global_pass(&global, branch, &identities, &mut emails);
        }

        let project_rules = match self.locate_project_rules(project) {
            Some((name, file)) => {
                tracing::info!(file = %name, "found reviewer config file for project");
                self.project_pass(&file, branch, files, &identities, &mut emails);
                Some(name)
            }
            None => {
                tracing::info!("found no reviewer config file for project");
                None
            }
        };

        let reviewers: Vec<String> = emails.into_iter().collect();
        tracing::info!(?reviewers, "all qualified reviewers");
        Resolution {
            reviewers,
            exemption: None,
            project_rules,
        }
    }

    fn load_identities(&self) -> Option<IdentityTable> {
        match self.store.load(IDENTITY_FILE) {
            Ok(Some(file)) => Some(IdentityTable::from_rule_file(&file)),
            Ok(None) => {
                tracing::error!(
                    file = %self.store.path_of(IDENTITY_FILE).display(),
                    "found no reviewers email config file"
                );
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot read reviewers email config file");
                None
            }
        }
    }

    /// Load `name`, logging parse or I/O failures and treating them as absent.
    fn load_logged(&self, name: &str) -> Option<RuleFile> {
        self.try_load(name).flatten()
    }

    /// The project's rule file, or the nearest ancestor's.
    ///
    /// A file that exists but cannot be parsed stops the search.
    fn locate_project_rules(&self, project: &str) -> Option<(String, RuleFile)> {
        let own = project_rules_file(project);
        if let Some(file) = self.try_load(&own)? {
            return Some((own, file));
        }

        for ancestor in ancestor_rules_files(&own) {
            tracing::info!(file = %ancestor, "search for upper level reviewer config file");
            if let Some(file) = self.try_load(&ancestor)? {
                tracing::info!(file = %ancestor, "found upper level config file");
                return Some((ancestor, file));
            }
        }
        None
    }

    /// `Some(None)` if absent, `None` if present but unusable.
    fn try_load(&self, name: &str) -> Option<Option<RuleFile>> {
        match self.store.load(name) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::error!(error = %e, "ignoring unreadable reviewer config file");
                None
            }
        }
    }

    fn global_pass(
        &self,
        file: &RuleFile,
        branch: &str,
        identities: &IdentityTable,
        emails: &mut IndexSet<String>,
    ) {
        for rule in FilterRule::all(file) {
            let kind = rule.expr.kind();
            tracing::debug!(scope = "global", filter = %rule.expr, kind, "found filter");
            match &rule.expr {
                FilterExpr::Malformed { raw, reason } => {
                    tracing::warn!(
                        scope = "global",
                        filter = %raw,
                        %reason,
                        "encounter unqualified filter"
                    );
                }
                FilterExpr::BranchOnly(_) if rule.expr.matches_branch(branch) => {
                    collect(&rule, "global", identities, emails);
                }
                FilterExpr::BranchOnly(_) => {
                    tracing::info!(
                        scope = "global",
                        filter = %rule.expr,
                        branch,
                        "filter not matched for branch"
                    );
                }
                _ => {
                    tracing::warn!(
                        scope = "global",
                        filter = %rule.expr,
                        kind,
                        "only branch filters are supported in global rules"
                    );
                }
            }
        }
    }

    fn project_pass(
        &self,
        file: &RuleFile,
        branch: &str,
        files: &[String],
        identities: &IdentityTable,
        emails: &mut IndexSet<String>,
    ) {
        for rule in FilterRule::all(file) {
            let kind = rule.expr.kind();
            tracing::debug!(scope = "project", filter = %rule.expr, kind, "found filter");
            match &rule.expr {
                FilterExpr::Malformed { raw, reason } => {
                    tracing::warn!(
                        scope = "project",
                        filter = %raw,
                        %reason,
                        "encounter unqualified filter"
                    );
                }
                _ if !rule.expr.matches_branch(branch) => {
                    tracing::info!(
                        scope = "project",
                        filter = %rule.expr,
                        branch,
                        "filter not matched for branch"
                    );
                }
                FilterExpr::BranchOnly(_) => collect(&rule, "project", identities, emails),
                FilterExpr::FileOnly(_) => match rule.expr.first_matching_file(files) {
                    Some(matched) => {
                        tracing::info!(scope = "project", file = matched, "found matched file");
                        collect(&rule, "project", identities, emails);
                    }
                    None => {
                        tracing::info!(scope = "project", filter = %rule.expr, "no file matched");
                    }
                },
                FilterExpr::BranchAndFile { .. } => {
                    for matched in rule.expr.matching_files(files) {
                        tracing::info!(scope = "project", file = matched, "found matched file");
                        collect(&rule, "project", identities, emails);
                    }
                }
            }
        }
    }
}

fn collect(
    rule: &FilterRule,
    scope: &'static str,
    identities: &IdentityTable,
    emails: &mut IndexSet<String>,
) {
    match &rule.reviewers {
        Ok(names) => {
            tracing::info!(scope, section = %rule.section, reviewers = ?names, "found reviewers");
            emails.extend(identities.emails_for(names));
        }
        Err(e) => {
            tracing::warn!(scope, section = %rule.section, error = %e, "rule has no reviewers");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const EMAILS: &str = "[Reviewers Email]\n\
        alice = alice@example.com\n\
        bob = bob@example.com\n\
        carol = carol@example.com\n\
        dave = dave@example.com\n";

    fn write(dir: &Path, name: &str, text: &str) {
        std::fs::write(dir.join(name), text).expect("write rule file");
    }

    fn setup(global: Option<&str>, projects: &[(&str, &str)]) -> (TempDir, ReviewerResolver) {
        let dir = tempfile::tempdir().expect("temp dir");
        write(dir.path(), IDENTITY_FILE, EMAILS);
        if let Some(text) = global {
            write(dir.path(), GLOBAL_RULES_FILE, text);
        }
        for (name, text) in projects {
            write(dir.path(), name, text);
        }
        let resolver = ReviewerResolver::new(
            RuleStore::new(dir.path()),
            ExceptionPolicy::default(),
        );
        (dir, resolver)
    }

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_exception_branch_returns_nothing() {
        let (_dir, resolver) = setup(Some("[filter \"branch:\"]\nreviewers = alice\n"), &[]);
        let result = resolver.resolve("p", "", 1, &[], None);
        assert!(result.is_empty());
    }

    #[test]
    fn test_exception_topic_returns_nothing() {
        let (_dir, resolver) = setup(
            Some("[filter \"branch:.*\"]\nreviewers = alice\n"),
            &[("p.cfg", "[filter \"file:.*\"]\nreviewers = bob\n")],
        );
        let resolution = resolver.resolve_parts(
            "p",
            "main",
            1,
            &files(&["a"]),
            Some("feature_int_sig-7"),
        );
        assert!(resolution.reviewers.is_empty());
        assert_eq!(
            resolution.exemption,
            Some(Exemption::Topic("feature_int_sig-7".to_string()))
        );
    }

    #[test]
    fn test_missing_identity_table_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), GLOBAL_RULES_FILE, "[filter \"branch:.*\"]\nreviewers = alice\n");
        let resolver =
            ReviewerResolver::new(RuleStore::new(dir.path()), ExceptionPolicy::default());
        assert!(resolver.resolve("p", "main", 1, &[], None).is_empty());
    }

    #[test]
    fn test_global_branch_rule() {
        let (_dir, resolver) = setup(
            Some("[filter \"branch:release/.*\"]\nreviewers = alice\n"),
            &[],
        );
        assert_eq!(
            resolver.resolve("p", "release/1.0", 1, &[], None),
            vec!["alice@example.com".to_string()]
        );
        assert!(resolver.resolve("p", "main", 1, &[], None).is_empty());
    }

    #[test]
    fn test_global_file_rules_are_skipped() {
        let (_dir, resolver) = setup(
            Some(
                "[filter \"file:.*\"]\nreviewers = alice\n\
                 [filter \"branch:main file:.*\"]\nreviewers = bob\n\
                 [filter \"branch:main\"]\nreviewers = carol\n",
            ),
            &[],
        );
        assert_eq!(
            resolver.resolve("p", "main", 1, &files(&["x"]), None),
            vec!["carol@example.com".to_string()]
        );
    }

    #[test]
    fn test_file_rule_contributes_once() {
        let (_dir, resolver) = setup(
            None,
            &[("p.cfg", "[filter \"file:src/.*\\.py\"]\nreviewers = bob\n")],
        );
        let changed = files(&["src/a.py", "docs/b.txt", "src/c.py"]);
        let result = resolver.resolve("p", "main", 1, &changed, None);
        assert_eq!(result, vec!["bob@example.com".to_string()]);
    }

    #[test]
    fn test_branch_and_file_rule_requires_branch() {
        let (_dir, resolver) = setup(
            None,
            &[("p.cfg", "[filter \"branch:main file:core/.*\"]\nreviewers = carol\n")],
        );
        let changed = files(&["core/lib.rs"]);
        assert!(resolver.resolve("p", "dev", 1, &changed, None).is_empty());
        assert_eq!(
            resolver.resolve("p", "main", 1, &changed, None),
            vec!["carol@example.com".to_string()]
        );
        assert!(resolver.resolve("p", "main", 1, &files(&["docs/x"]), None).is_empty());
    }

    #[test]
    fn test_global_and_project_are_unioned_and_deduplicated() {
        let (_dir, resolver) = setup(
            Some("[filter \"branch:main\"]\nreviewers = alice bob\n"),
            &[(
                "platform^build.cfg",
                "[filter \"branch:main\"]\nreviewers = bob carol\n\
                 [filter \"branch:main file:make/.*\"]\nreviewers = alice\n",
            )],
        );
        let result = resolver.resolve(
            "platform/build",
            "main",
            1,
            &files(&["make/a.mk", "make/b.mk"]),
            None,
        );
        assert_eq!(
            result,
            vec![
                "alice@example.com".to_string(),
                "bob@example.com".to_string(),
                "carol@example.com".to_string(),
            ]
        );
    }

    #[test]
    fn test_ancestor_fallback() {
        let (_dir, resolver) = setup(
            None,
            &[("platform.cfg", "[filter \"branch:.*\"]\nreviewers = dave\n")],
        );
        let resolution = resolver.resolve_parts("platform/tools/build", "main", 1, &[], None);
        assert_eq!(resolution.reviewers, vec!["dave@example.com".to_string()]);
        assert_eq!(resolution.project_rules.as_deref(), Some("platform.cfg"));
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let (_dir, resolver) = setup(
            None,
            &[
                ("a.cfg", "[filter \"branch:.*\"]\nreviewers = alice\n"),
                ("a^b.cfg", "[filter \"branch:.*\"]\nreviewers = bob\n"),
            ],
        );
        assert_eq!(
            resolver.resolve("a/b/c", "main", 1, &[], None),
            vec!["bob@example.com".to_string()]
        );
    }

    #[test]
    fn test_no_project_config_keeps_global_result() {
        let (_dir, resolver) = setup(
            Some("[filter \"branch:main\"]\nreviewers = alice\n"),
            &[("other.cfg", "[filter \"branch:.*\"]\nreviewers = bob\n")],
        );
        let resolution = resolver.resolve_parts("a/b", "main", 1, &[], None);
        assert_eq!(resolution.reviewers, vec!["alice@example.com".to_string()]);
        assert_eq!(resolution.project_rules, None);
    }

    #[test]
    fn test_unknown_reviewer_is_dropped() {
        let (_dir, resolver) = setup(
            Some("[filter \"branch:main\"]\nreviewers = ghost alice\n"),
            &[],
        );
        assert_eq!(
            resolver.resolve("p", "main", 1, &[], None),
            vec!["alice@example.com".to_string()]
        );
    }

    #[test]
    fn test_malformed_and_reviewerless_sections_are_skipped() {
        let (_dir, resolver) = setup(
            None,
            &[(
                "p.cfg",
                "[filter \"file:a branch:main\"]\nreviewers = alice\n\
                 [filter \"branch:main\"]\n\
                 [misc]\nreviewers = bob\n\
                 [filter \"branch:main\"]\n",
            )],
        );
        assert!(resolver.resolve("p", "main", 1, &files(&["a"]), None).is_empty());
    }

    #[test]
    fn test_unparsable_project_file_contributes_nothing() {
        let (_dir, resolver) = setup(
            Some("[filter \"branch:main\"]\nreviewers = alice\n"),
            &[
                ("a^b.cfg", "garbage line\n"),
                ("a.cfg", "[filter \"branch:.*\"]\nreviewers = bob\n"),
            ],
        );
        assert_eq!(
            resolver.resolve("a/b", "main", 1, &[], None),
            vec!["alice@example.com".to_string()]
        );
    }

    #[test]
    fn test_resolve_change_uses_change_fields() {
        let (_dir, resolver) = setup(
            None,
            &[("p.cfg", "[filter \"file:docs/\"]\nreviewers = carol\n")],
        );
        let change = Change {
            project: "p".to_string(),
            branch: "main".to_string(),
            change_number: 7,
            patchset_number: 1,
            topic: None,
            files: files(&["docs/index.md"]),
        };
        let resolution = resolver.resolve_change(&change);
        assert_eq!(resolution.reviewers, vec!["carol@example.com".to_string()]);
        assert_eq!(resolution.project_rules.as_deref(), Some("p.cfg"));
    }
}
