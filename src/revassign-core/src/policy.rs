//! Branches and topics excluded from automatic reviewer assignment.

use revassign_rules::Pattern;
use serde::Serialize;

/// Topics of integration changes, which never get reviewers assigned.
pub const DEFAULT_EXCEPTION_TOPIC_PATTERN: &str =
    r"(ui|bugfix|feature|pointfix|backward)_int_sig-[0-9]*";

/// Why a change was exempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Exemption {
    /// The branch is in the exception set.
    Branch(String),
    /// The topic matches the exception pattern.
    Topic(String),
}

/// Exception branches and topic pattern.
#[derive(Debug, Clone)]
pub struct ExceptionPolicy {
    branches: Vec<String>,
    topic: Option<Pattern>,
}

impl ExceptionPolicy {
    /// Build a policy from explicit branches and an optional topic pattern.
    pub fn new(
        branches: impl IntoIterator<Item = impl Into<String>>,
        topic_pattern: Option<&str>,
    ) -> Result<Self, regex::Error> {
        let topic = topic_pattern.map(Pattern::new).transpose()?;
        Ok(Self {
            branches: branches.into_iter().map(Into::into).collect(),
            topic,
        })
    }

    /// Exception branch names.
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Returns the exemption that applies to `branch` / `topic`, if any.
    ///
    /// An empty topic is treated as no topic.
    pub fn exemption(&self, branch: &str, topic: Option<&str>) -> Option<Exemption> {
        if self.branches.iter().any(|b| b == branch) {
            return Some(Exemption::Branch(branch.to_string()));
        }
        let topic = topic.filter(|t| !t.is_empty())?;
        let pattern = self.topic.as_ref()?;
        pattern
            .matches(topic)
            .then(|| Exemption::Topic(topic.to_string()))
    }
}

impl Default for ExceptionPolicy {
    fn default() -> Self {
        Self {
            branches: vec![String::new()],
            topic: Pattern::new(DEFAULT_EXCEPTION_TOPIC_PATTERN).ok(),
        }
    }
}
