//! Filter rules: a `filter "<expression>"` section and its reviewers.

use crate::error::ConfigKeyError;
use crate::filter::FilterExpr;
use crate::ini::{RuleFile, RuleSection};

/// Option holding the whitespace-separated reviewer names of a rule.
pub const REVIEWERS_OPTION_NAME: &str = "reviewers";

const FILTER_SECTION_PREFIX: &str = "filter";

/// One rule section of a rule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    /// Section name, e.g. `filter "branch:main"`.
    pub section: String,
    /// Parsed expression.
    pub expr: FilterExpr,
    /// Reviewer names, or the lookup error if the section has no reviewers.
    pub reviewers: Result<Vec<String>, ConfigKeyError>,
}

impl FilterRule {
    /// Build the rule for `section` of `file`.
    pub fn from_section(file: &RuleFile, section: &RuleSection) -> Self {
        let expr = match filter_expression(section.name()) {
            Some(raw) => FilterExpr::parse(raw),
            None => FilterExpr::Malformed {
                raw: section.name().to_string(),
                reason: "section is not of the form `filter \"<expression>\"`".to_string(),
            },
        };
        let reviewers = file
            .option(section.name(), REVIEWERS_OPTION_NAME)
            .map(split_reviewers);
        Self {
            section: section.name().to_string(),
            expr,
            reviewers,
        }
    }

    /// All rules of `file`, in section order.
    pub fn all(file: &RuleFile) -> Vec<Self> {
        file.sections()
            .map(|section| Self::from_section(file, section))
            .collect()
    }
}

/// Extract `<expression>` from `filter "<expression>"`.
fn filter_expression(section: &str) -> Option<&str> {
    let rest = section.strip_prefix(FILTER_SECTION_PREFIX)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.trim())
}

fn split_reviewers(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}
