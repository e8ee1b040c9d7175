//! Glossary loading and lookup.
//!
//! A glossary is a markdown document where every `### Term` heading opens an
//! entry and `**English**:`, `**Definition**:` and `**Pronunciation**:` lines
//! fill it in:
//!
//! ```text
//! ### CPR-nummer
//! **English**: Civil Registration Number
//! **Definition**: Personal identification number issued to residents
//! ```
//!
//! Each entry is reachable by its canonical term (original case and lower
//! case) and by its lower-cased English gloss.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::GlossaryError;

const ENGLISH_PREFIX: &str = "**English**:";
const DEFINITION_PREFIX: &str = "**Definition**:";
const PRONUNCIATION_PREFIX: &str = "**Pronunciation**:";

/// Conventional glossary locations, relative to the scanned path.
pub const GLOSSARY_CANDIDATES: &[&str] = &[
    "docs/denmark-living/metadata/glossary.md",
    "metadata/glossary.md",
];

/// One glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryEntry {
    /// Authoritative native-language form, as written in the heading.
    pub canonical_term: String,
    /// English translation.
    pub english: Option<String>,
    /// Definition text.
    pub definition: Option<String>,
    /// Pronunciation hint.
    pub pronunciation: Option<String>,
}

impl GlossaryEntry {
    fn new(canonical_term: String) -> Self {
        Self {
            canonical_term,
            english: None,
            definition: None,
            pronunciation: None,
        }
    }

    fn has_body(&self) -> bool {
        self.english.is_some() || self.definition.is_some() || self.pronunciation.is_some()
    }

    /// Whether `text` is, case-insensitively, the canonical term or the English gloss.
    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.canonical_term.to_lowercase() == lowered
            || self
                .english
                .as_ref()
                .is_some_and(|english| english.to_lowercase() == lowered)
    }
}

/// Term table built from a glossary document. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
    index: HashMap<String, usize>,
}

impl Glossary {
    /// Glossary with no entries; every glossary-dependent check is skipped.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse glossary text. Never fails: malformed lines are ignored and
    /// headings without any body line are dropped.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut glossary = Self::default();
        let mut current: Option<GlossaryEntry> = None;

        for raw_line in content.lines() {
            let line = raw_line.trim();

            if let Some(heading) = line.strip_prefix("### ") {
                if let Some(entry) = current.take() {
                    glossary.insert(entry);
                }
                let term = heading.trim();
                current = (!term.is_empty()).then(|| GlossaryEntry::new(term.to_owned()));
                continue;
            }

            // Any other heading level closes the open entry.
            if line.starts_with('#') {
                if let Some(entry) = current.take() {
                    glossary.insert(entry);
                }
                continue;
            }

            let Some(entry) = current.as_mut() else {
                continue;
            };
            if let Some(value) = field_value(line, ENGLISH_PREFIX) {
                entry.english = Some(value);
            } else if let Some(value) = field_value(line, DEFINITION_PREFIX) {
                entry.definition = Some(value);
            } else if let Some(value) = field_value(line, PRONUNCIATION_PREFIX) {
                entry.pronunciation = Some(value);
            }
        }

        if let Some(entry) = current {
            glossary.insert(entry);
        }
        glossary
    }

    /// Read and parse a glossary file.
    ///
    /// # Errors
    ///
    /// Returns [`GlossaryError::Read`] if the file cannot be read and
    /// [`GlossaryError::Empty`] if it holds no entries.
    pub fn try_load(path: &Path) -> Result<Self, GlossaryError> {
        let content = std::fs::read_to_string(path).map_err(|source| GlossaryError::Read {
            path: path.to_owned(),
            source,
        })?;
        let glossary = Self::parse(&content);
        if glossary.is_empty() {
            return Err(GlossaryError::Empty {
                path: path.to_owned(),
            });
        }
        debug!(path = %path.display(), entries = glossary.len(), "glossary loaded");
        Ok(glossary)
    }

    /// Load a glossary, failing soft: any problem is logged and an empty
    /// glossary is returned.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        Self::try_load(path).unwrap_or_else(|err| {
            warn!("{err}; glossary checks disabled");
            Self::empty()
        })
    }

    /// Load from an optional path; `None` yields an empty glossary.
    #[must_use]
    pub fn load_optional(path: Option<&Path>) -> Self {
        path.map_or_else(Self::empty, Self::load)
    }

    fn insert(&mut self, entry: GlossaryEntry) {
        if !entry.has_body() {
            return;
        }
        let idx = self.entries.len();
        self.index.insert(entry.canonical_term.clone(), idx);
        self.index.insert(entry.canonical_term.to_lowercase(), idx);
        if let Some(english) = &entry.english {
            self.index.insert(english.to_lowercase(), idx);
        }
        self.entries.push(entry);
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the glossary holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    /// All lookup keys (canonical, lower-cased canonical, lower-cased English).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Direct key lookup (exact key as stored in the table).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&GlossaryEntry> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    /// Find the entry for a surface form: exact key, then lower-cased key,
    /// then any entry whose English gloss matches case-insensitively.
    #[must_use]
    pub fn lookup(&self, term: &str) -> Option<&GlossaryEntry> {
        if let Some(entry) = self.get(term) {
            return Some(entry);
        }
        let lowered = term.to_lowercase();
        if let Some(entry) = self.get(&lowered) {
            return Some(entry);
        }
        self.entries.iter().find(|entry| {
            entry
                .english
                .as_ref()
                .is_some_and(|english| english.to_lowercase() == lowered)
        })
    }
}

fn field_value(line: &str, prefix: &str) -> Option<String> {
    line.strip_prefix(prefix).map(|rest| rest.trim().to_owned())
}

/// Find a glossary at one of the conventional locations around `path`.
///
/// Checks `<path>/<candidate>`, then `<path>/../<first candidate>`, then the
/// first candidate relative to the working directory.
#[must_use]
pub fn discover_glossary(path: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = GLOSSARY_CANDIDATES
        .iter()
        .map(|candidate| path.join(candidate))
        .collect();
    if let Some(parent) = path.parent() {
        candidates.push(parent.join(GLOSSARY_CANDIDATES[0]));
    }
    candidates.push(PathBuf::from(GLOSSARY_CANDIDATES[0]));

    candidates.into_iter().find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "# Glossary\n\n\
        ### CPR-nummer\n\
        **English**: Civil Registration Number\n\
        **Definition**: Personal identification number for residents\n\n\
        ### Sundhedskort\n\
        **English**: Health Insurance Card\n\
        **Pronunciation**: SOON-heds-kort\n\n\
        ### Empty heading\n\n\
        #### Not an entry\n\
        **Definition**: belongs to nothing\n";

    #[test]
    fn test_parse_entries_and_fields() {
        let glossary = Glossary::parse(SAMPLE);
        assert_eq!(glossary.len(), 2);

        let cpr = glossary.lookup("CPR-nummer").unwrap();
        assert_eq!(cpr.english.as_deref(), Some("Civil Registration Number"));
        assert!(cpr.definition.as_deref().unwrap().starts_with("Personal"));
        assert_eq!(cpr.pronunciation, None);

        let card = glossary.lookup("sundhedskort").unwrap();
        assert_eq!(card.pronunciation.as_deref(), Some("SOON-heds-kort"));
        assert_eq!(card.definition, None);
    }

    #[test]
    fn test_aliases_resolve_to_same_entry() {
        let glossary = Glossary::parse(SAMPLE);
        let by_native = glossary.get("CPR-nummer").unwrap();
        let by_lower = glossary.get("cpr-nummer").unwrap();
        let by_english = glossary.get("civil registration number").unwrap();
        assert_eq!(by_native, by_lower);
        assert_eq!(by_native, by_english);
    }

    #[test]
    fn test_lookup_by_english_any_case() {
        let glossary = Glossary::parse(SAMPLE);
        let entry = glossary.lookup("HEALTH INSURANCE CARD").unwrap();
        assert_eq!(entry.canonical_term, "Sundhedskort");
        assert!(glossary.lookup("Residence permit").is_none());
    }

    #[test]
    fn test_heading_without_body_is_omitted() {
        let glossary = Glossary::parse(SAMPLE);
        assert!(glossary.lookup("Empty heading").is_none());
        assert!(glossary.lookup("Not an entry").is_none());
    }

    #[test]
    fn test_entry_accepts_canonical_and_english() {
        let glossary = Glossary::parse(SAMPLE);
        let cpr = glossary.lookup("cpr-nummer").unwrap();
        assert!(cpr.accepts("cpr-NUMMER"));
        assert!(cpr.accepts("civil registration number"));
        assert!(!cpr.accepts("CPR number"));
    }

    #[test]
    fn test_load_missing_file_fails_soft() {
        let tmp = TempDir::new().unwrap();
        let glossary = Glossary::load(&tmp.path().join("missing.md"));
        assert!(glossary.is_empty());
    }

    #[test]
    fn test_try_load_empty_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("glossary.md");
        fs::write(&path, "# Glossary\n\nNothing here yet.\n").unwrap();
        let err = Glossary::try_load(&path).unwrap_err();
        assert!(matches!(err, GlossaryError::Empty { .. }));
        assert!(Glossary::load(&path).is_empty());
    }

    #[test]
    fn test_discover_glossary_under_metadata() {
        let tmp = TempDir::new().unwrap();
        let metadata = tmp.path().join("metadata");
        fs::create_dir_all(&metadata).unwrap();
        fs::write(metadata.join("glossary.md"), SAMPLE).unwrap();

        let found = discover_glossary(tmp.path()).unwrap();
        assert!(found.ends_with("metadata/glossary.md"));
    }
}
