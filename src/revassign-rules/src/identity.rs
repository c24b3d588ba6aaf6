//! Reviewer identity table (short name -> email).

use indexmap::IndexMap;

use crate::IDENTITY_SECTION;
use crate::ini::RuleFile;

/// Maps reviewer short names to email addresses.
///
/// Names are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityTable {
    emails: IndexMap<String, String>,
}

impl IdentityTable {
    /// Build the table from the `[Reviewers Email]` section of `file`.
    ///
    /// `[DEFAULT]` entries apply as they do for any other section lookup; the
    /// section's own entries take precedence. A file without that section
    /// gives an empty table.
    pub fn from_rule_file(file: &RuleFile) -> Self {
        let Some(section) = file.section(IDENTITY_SECTION) else {
            return Self::default();
        };
        let mut emails = IndexMap::new();
        for (name, email) in file.defaults().chain(section.options()) {
            emails.insert(name.to_string(), email.to_string());
        }
        Self { emails }
    }

    /// Email configured for `name`.
    pub fn email_for(&self, name: &str) -> Option<&str> {
        self.emails.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Map names to emails, dropping (and logging) names without an entry.
    pub fn emails_for<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut out = Vec::new();
        for name in names {
            match self.email_for(name) {
                Some(email) => out.push(email.to_string()),
                None => tracing::warn!(reviewer = %name, "no email configured for reviewer"),
            }
        }
        out
    }
}
