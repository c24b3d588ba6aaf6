//! INI-style rule file parser.
//!
//! The accepted dialect is the one operators write for the reviewer
//! configuration directory:
//! - `[section name]` headers
//! - `key = value` or `key: value` options, keys folded to lower case
//! - indented lines continue the previous value
//! - `#` and `;` comment lines, and ` ;` inline comments after a value
//! - a `[DEFAULT]` section whose options every other section inherits

use indexmap::IndexMap;

use crate::error::{ConfigKeyError, ParseError};

const DEFAULT_SECTION: &str = "DEFAULT";

/// One `[section]` of a rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSection {
    name: String,
    options: IndexMap<String, String>,
}

impl RuleSection {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: IndexMap::new(),
        }
    }

    /// Section name as written between the brackets.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own options in file order (defaults not included).
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A parsed rule file: ordered sections plus `[DEFAULT]` options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFile {
    sections: IndexMap<String, RuleSection>,
    defaults: IndexMap<String, String>,
}

impl RuleFile {
    /// Sections in order of first appearance.
    pub fn sections(&self) -> impl Iterator<Item = &RuleSection> {
        self.sections.values()
    }

    /// Section names in order of first appearance.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&RuleSection> {
        self.sections.get(name)
    }

    /// Number of sections, `[DEFAULT]` excluded.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if the file has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// `[DEFAULT]` options in file order.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of `key` in `section`, falling back to `[DEFAULT]`.
    pub fn option(&self, section: &str, key: &str) -> Result<&str, ConfigKeyError> {
        let sect = self
            .sections
            .get(section)
            .ok_or_else(|| ConfigKeyError::MissingSection(section.to_string()))?;
        let key = key.to_lowercase();
        sect.options
            .get(&key)
            .or_else(|| self.defaults.get(&key))
            .map(String::as_str)
            .ok_or_else(|| ConfigKeyError::MissingOption {
                section: section.to_string(),
                option: key,
            })
    }
}

/// Where the next option or continuation line is written.
enum Cursor {
    None,
    Defaults,
    Section(String),
}

/// Parse the text of a rule file.
pub fn parse(text: &str) -> Result<RuleFile, ParseError> {
    let mut file = RuleFile::default();
    let mut cursor = Cursor::None;
    let mut last_key: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = raw.starts_with(' ') || raw.starts_with('\t');
        if indented {
            if let Some(key) = &last_key {
                let target = match &cursor {
                    Cursor::Defaults => Some(&mut file.defaults),
                    Cursor::Section(name) => file.sections.get_mut(name).map(|s| &mut s.options),
                    Cursor::None => None,
                };
                if let Some(value) = target.and_then(|opts| opts.get_mut(key)) {
                    let extra = strip_inline_comment(trimmed);
                    if !extra.is_empty() {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(extra);
                    }
                    continue;
                }
            }
        }

        if let Some(name) = section_header(trimmed) {
            if name == DEFAULT_SECTION {
                cursor = Cursor::Defaults;
            } else {
                file.sections
                    .entry(name.to_string())
                    .or_insert_with(|| RuleSection::new(name));
                cursor = Cursor::Section(name.to_string());
            }
            last_key = None;
            continue;
        }

        let Some((key, value)) = split_option(trimmed) else {
            return Err(ParseError::InvalidLine {
                line: line_no,
                content: raw.to_string(),
            });
        };

        let options = match &cursor {
            Cursor::None => {
                return Err(ParseError::MissingSectionHeader {
                    line: line_no,
                    content: raw.to_string(),
                });
            }
            Cursor::Defaults => &mut file.defaults,
            Cursor::Section(name) => match file.sections.get_mut(name) {
                Some(section) => &mut section.options,
                None => continue,
            },
        };
        options.insert(key.clone(), value);
        last_key = Some(key);
    }

    Ok(file)
}

fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?;
    let end = inner.rfind(']')?;
    let name = inner[..end].trim();
    if name.is_empty() { None } else { Some(name) }
}

fn split_option(line: &str) -> Option<(String, String)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    let value = strip_inline_comment(line[pos + 1..].trim());
    Some((key.to_lowercase(), value.to_string()))
}

fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b';' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return value[..i].trim_end();
        }
    }
    value
}
