//! Generic terminology consistency checker.
//!
//! Extracts bolded, quoted, translated and glossary terms, then reports
//! terms written in more than one form inside a document, forms that
//! disagree with the glossary, and (per directory run) forms that disagree
//! across documents.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aggregate::UsageAccumulator;
use crate::config::LintConfig;
use crate::consistency::{check_against_glossary, check_file};
use crate::error::ScanError;
use crate::extract::TermExtractor;
use crate::glossary::Glossary;
use crate::occurrence::{ConsistencyFinding, GlossaryMismatch, TermOccurrence};
use crate::validator::{FileOutcome, Validator};

/// Terminology result for one document.
#[derive(Debug, Clone, Serialize)]
pub struct TerminologyFileReport {
    /// Source file.
    pub file: PathBuf,
    /// `false` once any inconsistency or mismatch was found, or the read failed.
    pub valid: bool,
    /// Read failure, if the file could not be checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every extracted occurrence, in extraction order.
    pub terms_found: Vec<TermOccurrence>,
    /// Keys written in more than one form in this document.
    pub potential_inconsistencies: Vec<ConsistencyFinding>,
    /// Forms that disagree with the glossary.
    pub glossary_mismatches: Vec<GlossaryMismatch>,
}

impl FileOutcome for TerminologyFileReport {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn error_count(&self) -> usize {
        self.potential_inconsistencies.len()
            + self.glossary_mismatches.len()
            + usize::from(self.error.is_some())
    }

    fn warning_count(&self) -> usize {
        0
    }
}

/// Directory counters for a terminology run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TerminologySummary {
    /// Files checked (including unreadable ones).
    pub total_files: usize,
    /// Files with at least one extracted term.
    pub files_with_terms: usize,
    /// Occurrences across all files.
    pub total_terms: usize,
    /// Distinct normalized keys across all files.
    pub unique_normalized_terms: usize,
    /// Keys seen in more than one form across all files.
    pub terms_with_variations: usize,
    /// Within-file inconsistency findings.
    pub total_file_inconsistencies: usize,
    /// Glossary mismatch findings.
    pub total_glossary_mismatches: usize,
}

/// Terminology checker bound to one glossary.
#[derive(Debug, Clone)]
pub struct TerminologyChecker {
    glossary: Glossary,
    extractor: TermExtractor,
}

impl TerminologyChecker {
    /// Build a checker. An empty glossary disables the glossary matcher and
    /// the cross-check; every other check still runs.
    #[must_use]
    pub fn new(glossary: Glossary, config: &LintConfig) -> Self {
        let extractor = TermExtractor::new(&glossary).with_stop_words(&config.extra_stop_words);
        Self {
            glossary,
            extractor,
        }
    }
}

impl Validator for TerminologyChecker {
    type FileReport = TerminologyFileReport;
    type Summary = TerminologySummary;

    fn name(&self) -> &'static str {
        "terminology"
    }

    fn glossary(&self) -> Option<&Glossary> {
        Some(&self.glossary)
    }

    fn validate_document(&self, content: &str, path: &Path) -> TerminologyFileReport {
        let terms_found = self.extractor.extract(content, path);
        let potential_inconsistencies = check_file(&terms_found);
        let glossary_mismatches = check_against_glossary(&terms_found, &self.glossary);
        TerminologyFileReport {
            file: path.to_path_buf(),
            valid: potential_inconsistencies.is_empty() && glossary_mismatches.is_empty(),
            error: None,
            terms_found,
            potential_inconsistencies,
            glossary_mismatches,
        }
    }

    fn unreadable(&self, error: &ScanError) -> TerminologyFileReport {
        TerminologyFileReport {
            file: error.file.clone(),
            valid: false,
            error: Some(error.message.clone()),
            terms_found: Vec::new(),
            potential_inconsistencies: Vec::new(),
            glossary_mismatches: Vec::new(),
        }
    }

    fn record(&self, accumulator: &mut UsageAccumulator, report: &TerminologyFileReport) {
        accumulator.record_occurrences(&report.terms_found);
    }

    fn summarize(
        &self,
        files: &[TerminologyFileReport],
        accumulator: &UsageAccumulator,
    ) -> TerminologySummary {
        TerminologySummary {
            total_files: files.len(),
            files_with_terms: files.iter().filter(|f| !f.terms_found.is_empty()).count(),
            total_terms: files.iter().map(|f| f.terms_found.len()).sum(),
            unique_normalized_terms: accumulator.unique_keys(),
            terms_with_variations: accumulator.keys_with_variations(),
            total_file_inconsistencies: files.iter().map(|f| f.potential_inconsistencies.len()).sum(),
            total_glossary_mismatches: files.iter().map(|f| f.glossary_mismatches.len()).sum(),
        }
    }

    fn canonical_form(&self, key: &str, forms: &[String]) -> Option<String> {
        self.glossary
            .get(key)
            .or_else(|| forms.iter().find_map(|form| self.glossary.lookup(form)))
            .map(|entry| entry.canonical_term.clone())
    }
}
