//! Validation report types.

use std::path::PathBuf;

use serde::Serialize;

use crate::aggregate::GlobalInconsistency;
use crate::error::ScanError;
use crate::validator::FileOutcome;

/// Result of one validator over one directory run.
///
/// CI pipelines must check `ok`: it is `false` when any file has an
/// error-severity finding, any global inconsistency was found, or any file
/// could not be scanned.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct DirectoryReport<F, S> {
    /// Validator that produced the report.
    pub validator: &'static str,
    /// Roots that were scanned.
    pub paths: Vec<PathBuf>,
    /// Whether a non-empty glossary was available.
    pub glossary_loaded: bool,
    /// Distinct glossary entries.
    pub glossary_terms_count: usize,
    /// Number of files successfully read and checked.
    pub scanned_files: usize,
    /// Number of files that could not be scanned.
    pub failed_files: usize,
    /// Whether the run is clean (see type docs).
    pub ok: bool,
    /// Per-file results, in scan order.
    pub files: Vec<F>,
    /// Cross-file findings, highest usage first.
    pub global_inconsistencies: Vec<GlobalInconsistency>,
    /// Validator-specific counters.
    pub summary: S,
    /// Files that could not be read or were cut off by limits.
    pub scan_errors: Vec<ScanError>,
}

impl<F: FileOutcome, S> DirectoryReport<F, S> {
    /// Total number of files attempted (scanned + failed).
    #[must_use]
    pub fn files_attempted(&self) -> usize {
        self.scanned_files + self.failed_files
    }

    /// Files that are not valid.
    #[must_use]
    pub fn invalid_files(&self) -> usize {
        self.files.iter().filter(|file| !file.is_valid()).count()
    }

    /// Error-severity findings across files plus global inconsistencies.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.files.iter().map(FileOutcome::error_count).sum::<usize>()
            + self.global_inconsistencies.len()
    }

    /// Warning-severity findings across files.
    #[must_use]
    pub fn warnings_count(&self) -> usize {
        self.files.iter().map(FileOutcome::warning_count).sum()
    }
}
