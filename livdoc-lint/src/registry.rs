//! Validator registry and orchestrated runs.
//!
//! The set of validators is closed: [`ValidatorKind`] names each one and
//! [`run`] dispatches to its [`Validator`](crate::Validator) implementation.
//! [`run_all`] loads the glossary once and aggregates the outcomes into a
//! [`RunReport`].

use std::fmt;
use std::str::FromStr;

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::acronym::{AcronymFileReport, AcronymSummary, AcronymValidator};
use crate::config::{FsSourceConfig, LintConfig};
use crate::glossary::Glossary;
use crate::report::DirectoryReport;
use crate::terminology::{TerminologyChecker, TerminologyFileReport, TerminologySummary};
use crate::translation::{TranslationFileReport, TranslationSummary, TranslationValidator};
use crate::validate_fs;

/// The available validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    /// Term consistency within and across documents, and against the glossary.
    Terminology,
    /// Acronym definitions on first use and their consistency.
    Acronyms,
    /// English translations for Danish terms.
    Translations,
}

impl ValidatorKind {
    /// Every validator, in run order.
    pub const ALL: [Self; 3] = [Self::Terminology, Self::Acronyms, Self::Translations];

    /// Machine name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Terminology => "terminology",
            Self::Acronyms => "acronyms",
            Self::Translations => "translations",
        }
    }

    /// One-line description for help and report headers.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Terminology => "Consistent use of domain terms across documents",
            Self::Acronyms => "Acronyms defined on first use and defined consistently",
            Self::Translations => "Danish terms carry English translations matching the glossary",
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown validator name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown validator '{0}' (expected terminology, acronyms or translations)")]
pub struct UnknownValidator(pub String);

impl FromStr for ValidatorKind {
    type Err = UnknownValidator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownValidator(s.to_owned()))
    }
}

/// Directory report of one validator, whichever it was.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ValidatorOutcome {
    /// Terminology run.
    Terminology(DirectoryReport<TerminologyFileReport, TerminologySummary>),
    /// Acronym run.
    Acronyms(DirectoryReport<AcronymFileReport, AcronymSummary>),
    /// Translation run.
    Translations(DirectoryReport<TranslationFileReport, TranslationSummary>),
}

impl ValidatorOutcome {
    /// Which validator produced this outcome.
    #[must_use]
    pub fn kind(&self) -> ValidatorKind {
        match self {
            Self::Terminology(_) => ValidatorKind::Terminology,
            Self::Acronyms(_) => ValidatorKind::Acronyms,
            Self::Translations(_) => ValidatorKind::Translations,
        }
    }

    /// Whether the run was clean.
    #[must_use]
    pub fn ok(&self) -> bool {
        match self {
            Self::Terminology(report) => report.ok,
            Self::Acronyms(report) => report.ok,
            Self::Translations(report) => report.ok,
        }
    }

    /// Error-severity findings, including global ones.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        match self {
            Self::Terminology(report) => report.errors_count(),
            Self::Acronyms(report) => report.errors_count(),
            Self::Translations(report) => report.errors_count(),
        }
    }

    /// Warning-severity findings.
    #[must_use]
    pub fn warnings_count(&self) -> usize {
        match self {
            Self::Terminology(report) => report.warnings_count(),
            Self::Acronyms(report) => report.warnings_count(),
            Self::Translations(report) => report.warnings_count(),
        }
    }

    /// Files that could not be scanned.
    #[must_use]
    pub fn failed_files(&self) -> usize {
        match self {
            Self::Terminology(report) => report.failed_files,
            Self::Acronyms(report) => report.failed_files,
            Self::Translations(report) => report.failed_files,
        }
    }
}

/// Overall verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// No errors and no warnings.
    Passed,
    /// Warnings only.
    Warnings,
    /// At least one error, or a file could not be scanned.
    Errors,
}

impl RunStatus {
    /// Upper-case label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Warnings => "WARNINGS",
            Self::Errors => "ERRORS",
        }
    }
}

/// Aggregate of several validator runs over the same paths.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct RunReport {
    /// Local time the run finished, RFC 3339.
    pub generated_at: String,
    /// One outcome per validator, in run order.
    pub outcomes: Vec<ValidatorOutcome>,
    /// Errors across all outcomes.
    pub total_errors: usize,
    /// Warnings across all outcomes.
    pub total_warnings: usize,
    /// Overall verdict.
    pub status: RunStatus,
}

impl RunReport {
    fn from_outcomes(outcomes: Vec<ValidatorOutcome>) -> Self {
        let total_errors = outcomes.iter().map(ValidatorOutcome::errors_count).sum();
        let total_warnings = outcomes.iter().map(ValidatorOutcome::warnings_count).sum();
        let status = if total_errors > 0 || outcomes.iter().any(|outcome| !outcome.ok()) {
            RunStatus::Errors
        } else if total_warnings > 0 {
            RunStatus::Warnings
        } else {
            RunStatus::Passed
        };
        Self {
            generated_at: Local::now().to_rfc3339(),
            outcomes,
            total_errors,
            total_warnings,
            status,
        }
    }

    /// Whether the run should fail a CI job. Warnings never do.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.status == RunStatus::Errors
    }
}

/// Run one validator with an already loaded glossary.
///
/// # Errors
///
/// Returns an error if `fs_config.paths` is empty or a path does not exist.
pub fn run_with_glossary(
    kind: ValidatorKind,
    glossary: &Glossary,
    config: &LintConfig,
    fs_config: &FsSourceConfig,
) -> anyhow::Result<ValidatorOutcome> {
    info!(validator = kind.name(), "running validator");
    Ok(match kind {
        ValidatorKind::Terminology => ValidatorOutcome::Terminology(validate_fs(
            &TerminologyChecker::new(glossary.clone(), config),
            fs_config,
        )?),
        ValidatorKind::Acronyms => {
            ValidatorOutcome::Acronyms(validate_fs(&AcronymValidator::new(config), fs_config)?)
        }
        ValidatorKind::Translations => ValidatorOutcome::Translations(validate_fs(
            &TranslationValidator::new(glossary.clone()),
            fs_config,
        )?),
    })
}

/// Run one validator, loading the glossary named in `config` (if any).
///
/// # Errors
///
/// Returns an error if `fs_config.paths` is empty or a path does not exist.
pub fn run(
    kind: ValidatorKind,
    config: &LintConfig,
    fs_config: &FsSourceConfig,
) -> anyhow::Result<ValidatorOutcome> {
    let glossary = Glossary::load_optional(config.glossary_path.as_deref());
    run_with_glossary(kind, &glossary, config, fs_config)
}

/// Run `kinds` in order over the same paths, sharing one glossary load.
///
/// # Errors
///
/// Returns an error if `fs_config.paths` is empty or a path does not exist.
pub fn run_all(
    kinds: &[ValidatorKind],
    config: &LintConfig,
    fs_config: &FsSourceConfig,
) -> anyhow::Result<RunReport> {
    let glossary = Glossary::load_optional(config.glossary_path.as_deref());
    let outcomes = kinds
        .iter()
        .map(|&kind| run_with_glossary(kind, &glossary, config, fs_config))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let report = RunReport::from_outcomes(outcomes);
    info!(
        status = report.status.label(),
        errors = report.total_errors,
        warnings = report.total_warnings,
        "run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip_through_from_str() {
        for kind in ValidatorKind::ALL {
            assert_eq!(kind.name().parse::<ValidatorKind>(), Ok(kind));
            assert!(!kind.description().is_empty());
        }
        assert_eq!("ACRONYMS".parse::<ValidatorKind>(), Ok(ValidatorKind::Acronyms));
        assert!("links".parse::<ValidatorKind>().is_err());
    }

    #[test]
    fn test_status_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&RunStatus::Warnings).unwrap(), "\"WARNINGS\"");
        assert_eq!(RunStatus::Errors.label(), "ERRORS");
    }

    #[test]
    fn test_empty_run_passes() {
        let report = RunReport::from_outcomes(Vec::new());
        assert_eq!(report.status, RunStatus::Passed);
        assert!(!report.has_errors());
    }
}
