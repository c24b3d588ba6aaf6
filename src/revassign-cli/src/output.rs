//! Rendering of the addition report.

use std::fmt::Write as _;

use anyhow::Result;
use revassign_core::{AdditionReport, Exemption};

/// Human-readable report.
pub fn render_text(report: &AdditionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "change {} ({} @ {}, patchset {})",
        report.change_number, report.project, report.branch, report.patchset
    );

    if let Some(exemption) = &report.exemption {
        let reason = match exemption {
            Exemption::Branch(branch) => format!("exception branch '{branch}'"),
            Exemption::Topic(topic) => format!("exception topic '{topic}'"),
        };
        let _ = writeln!(out, "  skipped: {reason}");
        return out;
    }

    let rules = report.project_rules.as_deref().unwrap_or("none");
    let _ = writeln!(out, "  project rules: {rules}");
    if report.reviewers.is_empty() {
        let _ = writeln!(out, "  no reviewers selected");
        return out;
    }

    let label = if report.dry_run { "would add" } else { "added" };
    let listed = if report.dry_run {
        &report.reviewers
    } else {
        &report.added
    };
    let _ = writeln!(out, "  {label} {} reviewer(s):", listed.len());
    for reviewer in listed {
        let _ = writeln!(out, "    {reviewer}");
    }
    out
}

/// Pretty-printed JSON report.
pub fn render_json(report: &AdditionReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn report() -> AdditionReport {
        AdditionReport {
            change_number: 42,
            project: "platform/build".to_string(),
            branch: "main".to_string(),
            patchset: 1,
            reviewers: vec!["alice@example.com".to_string(), "bob@example.com".to_string()],
            added: vec!["alice@example.com".to_string(), "bob@example.com".to_string()],
            dry_run: false,
            exemption: None,
            project_rules: Some("platform.cfg".to_string()),
        }
    }

    #[test]
    fn test_text_added() {
        assert_eq!(
            render_text(&report()),
            "change 42 (platform/build @ main, patchset 1)\n  \
             project rules: platform.cfg\n  \
             added 2 reviewer(s):\n    \
             alice@example.com\n    \
             bob@example.com\n"
        );
    }

    #[test]
    fn test_text_dry_run() {
        let mut report = report();
        report.dry_run = true;
        report.added.clear();
        assert!(render_text(&report).contains("would add 2 reviewer(s)"));
    }

    #[test]
    fn test_text_exempt() {
        let mut report = report();
        report.exemption = Some(Exemption::Branch(String::new()));
        report.reviewers.clear();
        assert!(render_text(&report).contains("skipped: exception branch ''"));
    }

    #[test]
    fn test_json() {
        let value: serde_json::Value =
            serde_json::from_str(&render_json(&report()).unwrap()).unwrap();
        assert_eq!(value["project_rules"], "platform.cfg");
        assert_eq!(value["added"].as_array().map(Vec::len), Some(2));
    }
}
