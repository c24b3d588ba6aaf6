//! Subset of Gerrit's `ChangeInfo` JSON that the client reads.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct ChangeInfo {
    pub project: String,
    pub branch: String,
    #[serde(default)]
    pub topic: Option<String>,
    pub current_revision: String,
    #[serde(default)]
    pub revisions: BTreeMap<String, RevisionInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevisionInfo {
    #[serde(rename = "_number")]
    pub number: u32,
    #[serde(default)]
    pub files: BTreeMap<String, FileInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FileInfo {
    #[serde(default)]
    pub old_path: Option<String>,
}
