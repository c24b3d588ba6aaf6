//! Rule store: loads rule files by name from the configuration directory.

use std::path::{Path, PathBuf};

use crate::error::RuleStoreError;
use crate::ini::{RuleFile, parse};

/// Directory-backed source of rule files.
#[derive(Debug, Clone)]
pub struct RuleStore {
    root: PathBuf,
}

impl RuleStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Configuration directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the rule file `name`.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Load and parse the rule file `name`.
    ///
    /// A missing file is an expected outcome and yields `Ok(None)`; the
    /// caller decides whether to fall back to another source.
    pub fn load(&self, name: &str) -> Result<Option<RuleFile>, RuleStoreError> {
        let path = self.path_of(name);
        if !path.is_file() {
            tracing::warn!(file = %path.display(), "found no reviewer config file");
            return Ok(None);
        }

        let text = std::fs::read_to_string(&path).map_err(|source| RuleStoreError::Io {
            path: path.clone(),
            source,
        })?;
        let file = parse(&text).map_err(|source| RuleStoreError::Parse {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            file = %path.display(),
            sections = file.len(),
            "found reviewer config file"
        );
        Ok(Some(file))
    }
}
