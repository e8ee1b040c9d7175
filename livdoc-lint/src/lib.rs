//! # livdoc-lint
//!
//! Terminology, acronym and translation consistency checks for a markdown
//! knowledge base with embedded Danish terms.
//!
//! The engine is split the same way for every check: an extractor turns a
//! document into [`TermOccurrence`]s, checkers compare them within the
//! document and against the [`Glossary`], and a per-run
//! [`UsageAccumulator`] reports terms written differently across files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use livdoc_lint::{validate_fs, FsSourceConfig, Glossary, LintConfig, TerminologyChecker};
//!
//! let glossary = Glossary::load(&PathBuf::from("metadata/glossary.md"));
//! let checker = TerminologyChecker::new(glossary, &LintConfig::default());
//! let fs_config = FsSourceConfig::with_paths(vec![PathBuf::from("docs")]);
//!
//! let report = validate_fs(&checker, &fs_config).unwrap();
//! println!("Files scanned: {}", report.scanned_files);
//! println!("Global inconsistencies: {}", report.global_inconsistencies.len());
//! println!("OK: {}", report.ok);
//! ```

pub mod acronym;
mod aggregate;
mod config;
mod consistency;
mod error;
mod extract;
mod glossary;
mod markdown;
mod normalize;
mod occurrence;
pub mod output;
pub mod registry;
mod report;
mod strategy;
pub mod terminology;
pub mod translation;
mod validator;

pub use aggregate::{GlobalInconsistency, UsageAccumulator};
pub use config::{FsSourceConfig, LintConfig};
pub use consistency::{check_against_glossary, check_file, group_by_key};
pub use error::{GlossaryError, ScanError, ScanErrorKind};
pub use extract::TermExtractor;
pub use glossary::{GLOSSARY_CANDIDATES, Glossary, GlossaryEntry, discover_glossary};
pub use normalize::{normalize, normalize_surface};
pub use occurrence::{
    ConsistencyFinding, ExtractionPattern, FindingKind, GlossaryMismatch, Location, Severity,
    TermOccurrence,
};
pub use registry::{RunReport, RunStatus, ValidatorKind, ValidatorOutcome};
pub use report::DirectoryReport;
pub use terminology::TerminologyChecker;
pub use validator::{FileOutcome, Validator};

use std::path::Path;

use tracing::{debug, info};

use strategy::fs::{ScanResult, find_files, read_file_bounded};

/// Run `validator` over every markdown file under the configured paths.
///
/// A fresh [`UsageAccumulator`] is created for the run, so global findings
/// never leak between runs.
///
/// # Errors
///
/// Returns an error if `fs_config.paths` is empty or if any provided path does not exist.
/// Returns `Ok` with `scanned_files: 0` if paths exist but contain no markdown files.
/// Unreadable files are reported per file and in `report.scan_errors`; they
/// never abort the run.
pub fn validate_fs<V: Validator>(
    validator: &V,
    fs_config: &FsSourceConfig,
) -> anyhow::Result<DirectoryReport<V::FileReport, V::Summary>> {
    if fs_config.paths.is_empty() {
        anyhow::bail!("No paths provided for validation");
    }

    for path in &fs_config.paths {
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }
    }

    let (files, mut scan_errors) = find_files(fs_config);

    let mut accumulator = UsageAccumulator::new();
    let mut reports = Vec::with_capacity(files.len());
    let mut scanned_files: usize = 0;
    // Discovery-stage failures are already in scan_errors; count them upfront.
    let mut failed_files: usize = scan_errors.len();
    let mut total_bytes: u64 = 0;

    for file_path in &files {
        if scanned_files + failed_files >= fs_config.max_files {
            scan_errors.push(ScanError::new(
                file_path.clone(),
                ScanErrorKind::LimitExceeded,
                format!(
                    "Scan aborted: max_files limit ({}) reached; remaining files not scanned",
                    fs_config.max_files
                ),
            ));
            failed_files += 1;
            break;
        }

        let content = match read_file_bounded(file_path, fs_config.max_file_size) {
            ScanResult::Ok(c) => c,
            ScanResult::Err(e) => {
                debug!(file = %file_path.display(), error = %e.message, "file could not be read");
                reports.push(validator.unreadable(&e));
                scan_errors.push(e);
                failed_files += 1;
                continue;
            }
        };

        let file_bytes = content.len() as u64;
        if total_bytes.saturating_add(file_bytes) > fs_config.max_total_bytes {
            scan_errors.push(ScanError::new(
                file_path.clone(),
                ScanErrorKind::LimitExceeded,
                format!(
                    "Scan aborted: max_total_bytes limit ({}) reached; remaining files not scanned",
                    fs_config.max_total_bytes
                ),
            ));
            failed_files += 1;
            break;
        }
        total_bytes = total_bytes.saturating_add(file_bytes);

        let report = validator.validate_document(&content, file_path);
        validator.record(&mut accumulator, &report);
        debug!(
            validator = validator.name(),
            file = %file_path.display(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "checked file"
        );
        reports.push(report);
        scanned_files += 1;
    }

    let summary = validator.summarize(&reports, &accumulator);
    let mut global_inconsistencies =
        accumulator.finish(|key, forms| validator.canonical_form(key, forms));
    global_inconsistencies.retain(|finding| !validator.forms_agree(&finding.variations));

    let ok = reports.iter().all(FileOutcome::is_valid)
        && global_inconsistencies.is_empty()
        && scan_errors.is_empty();

    info!(
        validator = validator.name(),
        scanned_files,
        failed_files,
        global = global_inconsistencies.len(),
        ok,
        "directory run complete"
    );

    let glossary_terms_count = validator.glossary().map_or(0, Glossary::len);
    Ok(DirectoryReport {
        validator: validator.name(),
        paths: fs_config.paths.clone(),
        glossary_loaded: glossary_terms_count > 0,
        glossary_terms_count,
        scanned_files,
        failed_files,
        ok,
        files: reports,
        global_inconsistencies,
        summary,
        scan_errors,
    })
}

/// Check a single document on disk.
///
/// Read failures are folded into the returned report (see
/// [`Validator::unreadable`]) rather than returned as errors.
#[must_use]
pub fn validate_path<V: Validator>(
    validator: &V,
    path: &Path,
    max_file_size: u64,
) -> V::FileReport {
    match read_file_bounded(path, max_file_size) {
        ScanResult::Ok(content) => validator.validate_document(&content, path),
        ScanResult::Err(error) => validator.unreadable(&error),
    }
}
