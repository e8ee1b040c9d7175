//! Shared output formatting for lint reports.
//!
//! Provides JSON and plain-text formatters. Color/terminal formatting is
//! intentionally excluded from this core module; that concern belongs to
//! the CLI layer.

use std::io::Write;

use serde::Serialize;

use crate::acronym::AcronymFileReport;
use crate::aggregate::GlobalInconsistency;
use crate::registry::{RunReport, ValidatorOutcome};
use crate::report::DirectoryReport;
use crate::terminology::TerminologyFileReport;
use crate::translation::TranslationFileReport;
use crate::validator::FileOutcome;

const WIDTH: usize = 80;

/// Format any report as pretty JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<T: Serialize>(report: &T, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Per-file lines for the human report.
trait FileLines: FileOutcome {
    fn path(&self) -> &std::path::Path;
    fn lines(&self, verbose: bool) -> Vec<String>;
}

impl FileLines for TerminologyFileReport {
    fn path(&self) -> &std::path::Path {
        &self.file
    }

    fn lines(&self, verbose: bool) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(error) = &self.error {
            lines.push(format!("error: {error}"));
        }
        for finding in &self.potential_inconsistencies {
            let forms: Vec<&str> = finding.surface_forms.iter().map(String::as_str).collect();
            lines.push(format!(
                "Line {}: '{}' written as {}",
                finding.first_line(),
                finding.normalized_key,
                forms.join(" / ")
            ));
        }
        for mismatch in &self.glossary_mismatches {
            let english = mismatch
                .english_translation
                .as_deref()
                .map_or_else(String::new, |english| format!(" ({english})"));
            lines.push(format!(
                "Line {}: '{}' differs from glossary '{}'{english}",
                mismatch.line(),
                mismatch.found_term,
                mismatch.canonical_term
            ));
        }
        if verbose {
            lines.extend(self.terms_found.iter().map(|term| {
                format!("  term: {} [{}]", term.raw_text, term.position())
            }));
        }
        lines
    }
}

impl FileLines for AcronymFileReport {
    fn path(&self) -> &std::path::Path {
        &self.file
    }

    fn lines(&self, verbose: bool) -> Vec<String> {
        message_lines(&self.errors, &self.warnings, verbose)
    }
}

impl FileLines for TranslationFileReport {
    fn path(&self) -> &std::path::Path {
        &self.file
    }

    fn lines(&self, verbose: bool) -> Vec<String> {
        message_lines(&self.errors, &self.warnings, verbose)
    }
}

fn message_lines(errors: &[String], warnings: &[String], verbose: bool) -> Vec<String> {
    let mut lines: Vec<String> = errors.iter().map(|e| format!("error: {e}")).collect();
    if verbose {
        lines.extend(warnings.iter().map(|w| format!("warning: {w}")));
    }
    lines
}

fn write_global(global: &GlobalInconsistency, writer: &mut dyn Write) -> anyhow::Result<()> {
    let usage: Vec<String> = global
        .usage_stats
        .iter()
        .map(|(form, count)| format!("'{form}' x{count}"))
        .collect();
    writeln!(
        writer,
        "  '{}' ({} uses): {}",
        global.normalized_key,
        global.total_usage,
        usage.join(", ")
    )?;
    writeln!(writer, "      recommended: '{}'", global.recommended)?;
    Ok(())
}

fn write_directory<F: FileLines, S>(
    report: &DirectoryReport<F, S>,
    verbose: bool,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    if report.glossary_loaded {
        writeln!(writer, "  Glossary terms: {}", report.glossary_terms_count)?;
    }
    writeln!(writer, "  Files scanned:  {}", report.scanned_files)?;
    writeln!(writer, "  Files failed:   {}", report.failed_files)?;
    writeln!(writer, "  Errors found:   {}", report.errors_count())?;
    writeln!(writer, "  Warnings:       {}", report.warnings_count())?;

    for file in &report.files {
        let lines = file.lines(verbose);
        if lines.is_empty() {
            continue;
        }
        writeln!(writer)?;
        let mark = if file.is_valid() { "\u{2713}" } else { "\u{2717}" };
        writeln!(writer, "  {mark} {}", file.path().display())?;
        for line in lines {
            writeln!(writer, "      {line}")?;
        }
    }

    if !report.global_inconsistencies.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "  Inconsistent across files:")?;
        for global in &report.global_inconsistencies {
            write_global(global, writer)?;
        }
    }

    if !report.scan_errors.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "  Scan errors (files that could not be checked):")?;
        for scan_err in &report.scan_errors {
            writeln!(writer, "  {}", scan_err.format_human_readable())?;
        }
    }
    Ok(())
}

/// Format a [`RunReport`] as human-readable plain text to a writer.
///
/// With `verbose`, warnings and every extracted term are listed too.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &RunReport, verbose: bool, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(WIDTH))?;
    writeln!(writer, "  LIVDOC CONSISTENCY REPORT")?;
    writeln!(writer, "  Generated: {}", report.generated_at)?;
    writeln!(writer, "{}", "=".repeat(WIDTH))?;

    for outcome in &report.outcomes {
        let kind = outcome.kind();
        writeln!(writer)?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;
        writeln!(writer, "  {}: {}", kind.name().to_uppercase(), kind.description())?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;
        match outcome {
            ValidatorOutcome::Terminology(directory) => write_directory(directory, verbose, writer),
            ValidatorOutcome::Acronyms(directory) => write_directory(directory, verbose, writer),
            ValidatorOutcome::Translations(directory) => write_directory(directory, verbose, writer),
        }?;
    }

    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(WIDTH))?;
    writeln!(
        writer,
        "  Status: {} ({} error(s), {} warning(s))",
        report.status.label(),
        report.total_errors,
        report.total_warnings
    )?;
    writeln!(writer, "{}", "=".repeat(WIDTH))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FsSourceConfig, LintConfig};
    use crate::registry::{ValidatorKind, run_all};
    use std::fs;
    use tempfile::TempDir;

    fn sample_run() -> (TempDir, RunReport) {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("tax.md"),
            "SKAT sends letters.\nAsk SKAT.\n\n**Skattekort** (tax card) first.\n\n**Skattekort** (payslip) later.\n",
        )
        .unwrap();
        let fs_config = FsSourceConfig::with_paths(vec![tmp.path().to_path_buf()]);
        let report = run_all(&ValidatorKind::ALL, &LintConfig::default(), &fs_config).unwrap();
        (tmp, report)
    }

    #[test]
    fn test_human_output_lists_findings_and_status() {
        let (_tmp, report) = sample_run();
        let mut out = Vec::new();
        write_human(&report, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("LIVDOC CONSISTENCY REPORT"));
        assert!(text.contains("ACRONYMS"));
        assert!(text.contains("Acronym 'SKAT' used without definition"));
        assert!(text.contains("'skattekort' translated inconsistently"));
        assert!(text.contains("Status: ERRORS"));
    }

    #[test]
    fn test_json_output_is_valid() {
        let (_tmp, report) = sample_run();
        let mut out = Vec::new();
        write_json(&report, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["status"], "ERRORS");
        assert_eq!(value["outcomes"].as_array().unwrap().len(), 3);
        assert_eq!(value["outcomes"][1]["validator"], "acronyms");
    }
}
