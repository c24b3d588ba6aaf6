//! Change metadata as seen by the resolver.

use serde::{Deserialize, Serialize};

/// The parts of a review-server change that reviewer assignment needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Project (repository) path, e.g. `platform/build`.
    pub project: String,
    /// Target branch.
    pub branch: String,
    /// Numeric change id.
    pub change_number: u64,
    /// Number of the current patchset.
    pub patchset_number: u32,
    /// Topic, if one is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Paths touched by the current patchset, including rename sources.
    #[serde(default)]
    pub files: Vec<String>,
}
