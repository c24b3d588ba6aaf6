#![allow(clippy::missing_errors_doc, clippy::uninlined_format_args)]
//! Revassign Rules - reviewer rule files and filter matching.
//!
//! This crate owns everything that is read from the operator-maintained
//! reviewer configuration directory:
//! - `RuleFile` - a parsed INI-style file (ordered sections and options)
//! - `RuleStore` - loads rule files by name from a directory
//! - `FilterExpr` - the typed filter expression of a `filter "..."` section
//! - `FilterRule` - a filter expression paired with its reviewer names
//! - `IdentityTable` - reviewer short name to email mapping
//!
//! # Rule file layout
//!
//! ```text
//! reviewer-config/
//! ├── reviewers_email.cfg        [Reviewers Email]  alice = alice@example.com
//! ├── global_reviewers.cfg       [filter "branch:release/.*"]
//! ├── platform^build.cfg         [filter "file:make/.*"]
//! └── platform.cfg               ancestor of platform/* projects
//! ```
//!
//! Parsing is pure: every load returns a fresh `RuleFile`, so rule sets from
//! different sources never leak into one another.


mod error;
mod filter;
mod identity;
mod ini;
mod rule;
mod store;

pub use error::{ConfigKeyError, ParseError, RuleStoreError};
pub use filter::{FilterExpr, Pattern};
pub use identity::IdentityTable;
pub use ini::{RuleFile, RuleSection, parse};
pub use rule::{FilterRule, REVIEWERS_OPTION_NAME};
pub use store::RuleStore;

/// Global reviewer rules applied to every project.
pub const GLOBAL_RULES_FILE: &str = "global_reviewers.cfg";

/// Reviewer name to email mapping.
pub const IDENTITY_FILE: &str = "reviewers_email.cfg";

/// Section of the identity file holding the name/email entries.
pub const IDENTITY_SECTION: &str = "Reviewers Email";

/// Character substituted for `/` when turning a project name into a file name.
pub const PROJECT_PATH_SEPARATOR: char = '^';

/// Suffix of every rule file.
pub const RULE_FILE_SUFFIX: &str = ".cfg";

/// Rule file name for a project, e.g. `platform/build` -> `platform^build.cfg`.
pub fn project_rules_file(project: &str) -> String {
    format!(
        "{}{}",
        project.replace('/', &PROJECT_PATH_SEPARATOR.to_string()),
        RULE_FILE_SUFFIX
    )
}

/// Rule file names of the ancestors of `rules_file`, nearest first.
///
/// The suffix is stripped from the file name and the separator mapped back to
/// `/` before walking up one path segment at a time.
pub fn ancestor_rules_files(rules_file: &str) -> Vec<String> {
    let stem = rules_file
        .strip_suffix(RULE_FILE_SUFFIX)
        .unwrap_or(rules_file)
        .replace(PROJECT_PATH_SEPARATOR, "/");

    let mut out = Vec::new();
    let mut current = stem.as_str();
    while let Some((parent, _)) = current.rsplit_once('/') {
        if parent.is_empty() {
            break;
        }
        out.push(project_rules_file(parent));
        current = parent;
    }
    out
}
