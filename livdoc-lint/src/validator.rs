//! The interface every document validator implements.
//!
//! A directory run drives a validator through the same five steps no
//! matter which variant it is: check each document, record its usage into
//! the run's [`UsageAccumulator`], summarize, and resolve canonical forms
//! for the global findings. See [`crate::validate_fs`].

use std::path::Path;

use serde::Serialize;

use crate::aggregate::UsageAccumulator;
use crate::error::ScanError;
use crate::glossary::Glossary;

/// Per-file result of a validator.
pub trait FileOutcome {
    /// `false` once the file carries an error-severity finding or could not be read.
    fn is_valid(&self) -> bool;
    /// Number of error-severity findings.
    fn error_count(&self) -> usize;
    /// Number of warning-severity findings.
    fn warning_count(&self) -> usize;
}

/// A document validator variant (terminology, acronyms, translations).
pub trait Validator {
    /// Result for one document.
    type FileReport: FileOutcome + Serialize;
    /// Directory-level counters.
    type Summary: Serialize;

    /// Short machine name (`terminology`, `acronyms`, ...).
    fn name(&self) -> &'static str;

    /// Glossary in use, if this validator consults one.
    fn glossary(&self) -> Option<&Glossary>;

    /// Check one document's text.
    fn validate_document(&self, content: &str, path: &Path) -> Self::FileReport;

    /// Result for a document that could not be read. Contributes nothing
    /// to aggregation and is never valid.
    fn unreadable(&self, error: &ScanError) -> Self::FileReport;

    /// Feed one document's usage into the run accumulator.
    fn record(&self, accumulator: &mut UsageAccumulator, report: &Self::FileReport);

    /// Directory counters, computed before the accumulator is consumed.
    fn summarize(&self, files: &[Self::FileReport], accumulator: &UsageAccumulator)
    -> Self::Summary;

    /// Authoritative form for a key written several ways, if known.
    fn canonical_form(&self, key: &str, forms: &[String]) -> Option<String>;

    /// Whether distinct recorded forms still mean the same thing, in which
    /// case the key is not reported globally.
    fn forms_agree(&self, _forms: &[String]) -> bool {
        false
    }
}
