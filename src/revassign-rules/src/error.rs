//! Error types for rule loading and lookup.

use std::path::PathBuf;

use thiserror::Error;

/// A rule file could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Option line found before any `[section]` header.
    #[error("line {line}: option outside of any section: {content:?}")]
    MissingSectionHeader { line: usize, content: String },

    /// Line is neither a header, option, continuation, comment nor blank.
    #[error("line {line}: unrecognized line: {content:?}")]
    InvalidLine { line: usize, content: String },
}

/// Lookup of a section or option that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigKeyError {
    /// No section with that name.
    #[error("no section: {0:?}")]
    MissingSection(String),

    /// The section exists but has no such option.
    #[error("no option {option:?} in section {section:?}")]
    MissingOption { section: String, option: String },
}

/// Errors raised while loading a rule file from disk.
///
/// A file that does not exist is not an error; see [`crate::RuleStore::load`].
#[derive(Debug, Error)]
pub enum RuleStoreError {
    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid rule file.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}
