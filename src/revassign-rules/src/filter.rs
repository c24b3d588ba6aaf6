//! Filter expressions of `filter "..."` rule sections.
//!
//! Three shapes are accepted:
//!
//! | Expression                      | Variant         |
//! |---------------------------------|-----------------|
//! | `branch:<pattern>`              | `BranchOnly`    |
//! | `file:<pattern>`                | `FileOnly`      |
//! | `branch:<pattern> file:<pattern>` | `BranchAndFile` |
//!
//! Everything else parses to `Malformed` and never matches. Patterns are
//! regular expressions matched from the start of the subject, not against
//! the whole string.

use regex::Regex;

const BRANCH_KEYWORD: &str = "branch:";
const FILE_KEYWORD: &str = "file:";

/// A compiled pattern that matches from the start of its subject.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`, anchoring it at the start of the subject.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Pattern text as written in the rule file.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the pattern matches at the start of `subject`.
    pub fn matches(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

/// Parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    /// `branch:<pattern>`
    BranchOnly(Pattern),
    /// `file:<pattern>`
    FileOnly(Pattern),
    /// `branch:<pattern> file:<pattern>`
    BranchAndFile { branch: Pattern, file: Pattern },
    /// Anything else; kept with the reason it was rejected.
    Malformed { raw: String, reason: String },
}

impl FilterExpr {
    /// Parse a filter expression such as `branch:main file:core/.*`.
    pub fn parse(raw: &str) -> Self {
        let tokens: Vec<&str> = raw.split_whitespace().collect();

        // Keywords are recognised by token prefix only; a pattern may itself contain `file:`.
        match tokens.as_slice() {
            [single] => {
                if let Some(p) = single.strip_prefix(BRANCH_KEYWORD) {
                    match Pattern::new(p) {
                        Ok(pattern) => Self::BranchOnly(pattern),
                        Err(e) => Self::malformed(raw, format!("invalid branch pattern: {e}")),
                    }
                } else if let Some(p) = single.strip_prefix(FILE_KEYWORD) {
                    match Pattern::new(p) {
                        Ok(pattern) => Self::FileOnly(pattern),
                        Err(e) => Self::malformed(raw, format!("invalid file pattern: {e}")),
                    }
                } else {
                    Self::malformed(raw, "expected `branch:` or `file:`")
                }
            }
            [first, second] => {
                let (Some(b), Some(f)) = (
                    first.strip_prefix(BRANCH_KEYWORD),
                    second.strip_prefix(FILE_KEYWORD),
                ) else {
                    return Self::malformed(raw, "expected `branch:<pattern> file:<pattern>`");
                };
                let branch = match Pattern::new(b) {
                    Ok(p) => p,
                    Err(e) => return Self::malformed(raw, format!("invalid branch pattern: {e}")),
                };
                let file = match Pattern::new(f) {
                    Ok(p) => p,
                    Err(e) => return Self::malformed(raw, format!("invalid file pattern: {e}")),
                };
                Self::BranchAndFile { branch, file }
            }
            [] => Self::malformed(raw, "empty expression"),
            _ => Self::malformed(raw, "too many tokens"),
        }
    }

    fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    /// Short label for log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BranchOnly(_) => "branch",
            Self::FileOnly(_) => "file",
            Self::BranchAndFile { .. } => "branch+file",
            Self::Malformed { .. } => "malformed",
        }
    }

    /// Branch predicate. `FileOnly` has none and always passes; `Malformed`
    /// never passes.
    pub fn matches_branch(&self, branch: &str) -> bool {
        match self {
            Self::BranchOnly(p) | Self::BranchAndFile { branch: p, .. } => p.matches(branch),
            Self::FileOnly(_) => true,
            Self::Malformed { .. } => false,
        }
    }

    /// First file matching the file predicate, if any.
    pub fn first_matching_file<'a>(&self, files: &'a [String]) -> Option<&'a str> {
        let pattern = self.file_pattern()?;
        files
            .iter()
            .map(String::as_str)
            .find(|f| pattern.matches(f))
    }

    /// Every file matching the file predicate, in input order.
    pub fn matching_files<'a>(&self, files: &'a [String]) -> Vec<&'a str> {
        let Some(pattern) = self.file_pattern() else {
            return Vec::new();
        };
        files
            .iter()
            .map(String::as_str)
            .filter(|f| pattern.matches(f))
            .collect()
    }

    fn file_pattern(&self) -> Option<&Pattern> {
        match self {
            Self::FileOnly(p) | Self::BranchAndFile { file: p, .. } => Some(p),
            _ => None,
        }
    }
}

impl std::fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BranchOnly(p) => write!(f, "{}{}", BRANCH_KEYWORD, p.as_str()),
            Self::FileOnly(p) => write!(f, "{}{}", FILE_KEYWORD, p.as_str()),
            Self::BranchAndFile { branch, file } => write!(
                f,
                "{}{} {}{}",
                BRANCH_KEYWORD,
                branch.as_str(),
                FILE_KEYWORD,
                file.as_str()
            ),
            Self::Malformed { raw, .. } => write!(f, "{}", raw),
        }
    }
}
