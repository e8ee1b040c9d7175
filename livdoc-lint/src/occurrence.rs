//! Term occurrences and consistency findings.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::normalize::normalize;

/// Which matcher produced an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPattern {
    /// `**phrase**`
    Bolded,
    /// `"phrase"`
    Quoted,
    /// `Term (translation)`
    WithTranslation,
    /// A glossary key found in running text.
    GlossaryTerm,
    /// `ACRONYM (definition)` or `Definition (ACRONYM)`.
    AcronymDefinition,
    /// A bare acronym.
    Acronym,
    /// `**term** (translation)` where the term looks native.
    BoldedWithTranslation,
    /// `Term (translation)` where the term looks native.
    UnboldedWithTranslation,
    /// A glossary term used without a translation on the same line.
    GlossaryTermNoTranslation,
}

/// One term found in a document. Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermOccurrence {
    /// Matched text as written.
    #[serde(rename = "term")]
    pub raw_text: String,
    /// Grouping key, see [`crate::normalize`].
    #[serde(rename = "normalized_term")]
    pub normalized_key: String,
    /// Parenthetical translation or acronym expansion, when captured.
    pub translation: Option<String>,
    /// Source file.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters).
    pub column: usize,
    /// The trimmed source line.
    pub context: String,
    /// Matcher that claimed the span.
    #[serde(rename = "pattern_type")]
    pub pattern: ExtractionPattern,
}

impl TermOccurrence {
    /// Build an occurrence, computing the normalized key from `raw_text`.
    #[must_use]
    pub fn new(
        raw_text: &str,
        translation: Option<&str>,
        location: &Location<'_>,
        pattern: ExtractionPattern,
    ) -> Self {
        Self {
            raw_text: raw_text.to_owned(),
            normalized_key: normalize(raw_text),
            translation: translation.map(str::to_owned),
            file: location.file.to_path_buf(),
            line: location.line,
            column: location.column,
            context: location.context.trim().to_owned(),
            pattern,
        }
    }

    /// `file:line:column` for human output.
    #[must_use]
    pub fn position(&self) -> String {
        format!("{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Where a match was found; shared by every matcher on a line.
#[derive(Debug, Clone)]
pub struct Location<'a> {
    /// Source file.
    pub file: &'a Path,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Raw source line.
    pub context: &'a str,
}

/// How bad a finding is. Only errors make a file invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; never fails a run.
    Warning,
    /// Fails the file and the run.
    Error,
}

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// One key written with more than one surface form.
    Inconsistency,
    /// A surface form that diverges from the glossary's canonical form.
    GlossaryMismatch,
    /// A term used without the definition or translation it needs.
    MissingDefinition,
    /// A term the glossary does not know.
    UnknownTerm,
}

impl FindingKind {
    /// Default severity for this kind of finding.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::Inconsistency | Self::GlossaryMismatch | Self::MissingDefinition => {
                Severity::Error
            }
            Self::UnknownTerm => Severity::Warning,
        }
    }
}

/// A within-document finding for one normalized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyFinding {
    /// What was detected.
    #[serde(rename = "type")]
    pub kind: FindingKind,
    /// Error or warning.
    pub severity: Severity,
    /// Key the occurrences share.
    #[serde(rename = "normalized_term")]
    pub normalized_key: String,
    /// Distinct surface forms involved, sorted.
    #[serde(rename = "variations")]
    pub surface_forms: BTreeSet<String>,
    /// Occurrences behind the finding, in document order.
    #[serde(rename = "instances")]
    pub locations: Vec<TermOccurrence>,
}

impl ConsistencyFinding {
    /// Build a finding with the kind's default severity.
    #[must_use]
    pub fn new(kind: FindingKind, normalized_key: &str, locations: Vec<TermOccurrence>) -> Self {
        let surface_forms = locations.iter().map(|occ| occ.raw_text.clone()).collect();
        Self {
            kind,
            severity: kind.severity(),
            normalized_key: normalized_key.to_owned(),
            surface_forms,
            locations,
        }
    }

    /// First line involved, for sorting and messages.
    #[must_use]
    pub fn first_line(&self) -> usize {
        self.locations.iter().map(|occ| occ.line).min().unwrap_or(0)
    }
}

/// A surface form that disagrees with the glossary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryMismatch {
    /// Always [`FindingKind::GlossaryMismatch`].
    #[serde(rename = "type")]
    pub kind: FindingKind,
    /// Always [`Severity::Error`].
    pub severity: Severity,
    /// Form found in the document.
    pub found_term: String,
    /// Glossary canonical form.
    pub canonical_term: String,
    /// Glossary English form, if any.
    pub english_translation: Option<String>,
    /// The occurrence that triggered the mismatch.
    pub occurrence: TermOccurrence,
}

impl GlossaryMismatch {
    /// Build a mismatch for `occurrence`.
    #[must_use]
    pub fn new(
        occurrence: &TermOccurrence,
        canonical_term: &str,
        english_translation: Option<&str>,
    ) -> Self {
        Self {
            kind: FindingKind::GlossaryMismatch,
            severity: Severity::Error,
            found_term: occurrence.raw_text.clone(),
            canonical_term: canonical_term.to_owned(),
            english_translation: english_translation.map(str::to_owned),
            occurrence: occurrence.clone(),
        }
    }

    /// Line of the offending occurrence.
    #[must_use]
    pub fn line(&self) -> usize {
        self.occurrence.line
    }
}
