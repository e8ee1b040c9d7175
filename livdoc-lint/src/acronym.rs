//! Acronym checks: defined on first use, defined consistently.
//!
//! Acronyms are ALL-CAPS tokens of two to ten letters. A definition is
//! either `ACRONYM (Expansion)` or `Expansion Phrase (ACRONYM)`. Very common
//! acronyms (see [`SKIP_ACRONYMS`]) and Roman numerals are ignored.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::aggregate::UsageAccumulator;
use crate::config::LintConfig;
use crate::error::ScanError;
use crate::glossary::Glossary;
use crate::markdown::{column_of, prose_lines};
use crate::normalize::normalize_surface;
use crate::occurrence::{ExtractionPattern, Location, TermOccurrence};
use crate::validator::{FileOutcome, Validator};

/// Expected expansions for acronyms common in the documentation.
pub const ACRONYM_DICTIONARY: &[(&str, &str)] = &[
    ("CPR", "Civil Registration Number"),
    ("EU", "European Union"),
    ("EEA", "European Economic Area"),
    ("GP", "General Practitioner"),
    ("ICS", "International Citizen Service"),
    ("SKAT", "Danish Tax Authority"),
    ("SU", "State Educational Support"),
    ("VAT", "Value Added Tax"),
    ("CVR", "Central Business Register"),
    ("AM", "Labor Market"),
    ("FAQ", "Frequently Asked Questions"),
    ("ID", "Identification"),
    ("NFC", "Near Field Communication"),
    ("PIN", "Personal Identification Number"),
    ("SMS", "Short Message Service"),
    ("URL", "Uniform Resource Locator"),
    ("PDF", "Portable Document Format"),
];

/// Acronyms common enough to never need a definition. Wins over the dictionary.
pub const SKIP_ACRONYMS: &[&str] = &[
    "OK", "USA", "UK", "TV", "PC", "IT", "HR", "PR", "CEO", "CTO", "CFO", "AM", "PM", "GMT", "UTC",
    "HTTP", "HTTPS", "WWW", "HTML", "CSS", "JS",
];

/// Expansions that mean the same thing despite different wording.
const DEFINITION_SYNONYMS: &[(&str, &str)] = &[
    ("civil registration number", "personal identification number"),
    ("european union", "eu"),
    ("value added tax", "vat"),
    ("frequently asked questions", "faq"),
];

const MAX_ACRONYM_CHARS: usize = 10;

/// More undefined uses than this earns a best-practice warning.
const NEVER_DEFINED_WARNING_THRESHOLD: usize = 3;

static ACRONYM_THEN_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"\b([A-Z]{2,})\s*\(([^)]+)\)") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid acronym definition regex: {err}"),
    });

static DEFINITION_THEN_ACRONYM: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(concat!(
        r"\b([A-Z][a-z]+(?:[ \t]+(?:[A-Z][a-z]+|of|and|for|the|on))*)",
        r"\s*\(([A-Z]{2,})\)",
    )) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid expansion regex: {err}"),
    }
});

static STANDALONE_ACRONYM: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"\b([A-Z]{2,})\b") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid acronym regex: {err}"),
    });

static ROMAN_NUMERAL: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^[IVX]+$") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid roman numeral regex: {err}"),
});

/// Lower-case words an expansion may contain without contributing a letter.
const EXPANSION_CONNECTORS: &[&str] = &["of", "and", "for", "the", "on"];

fn is_connector(word: &str) -> bool {
    EXPANSION_CONNECTORS
        .iter()
        .any(|connector| connector.eq_ignore_ascii_case(word))
}

/// Trim a title-case run preceding `(ACRONYM)` to the shortest suffix whose
/// word initials spell the acronym, so a sentence-initial verb is not kept
/// as part of the expansion. Returns the whole run when no suffix fits.
fn fit_expansion<'a>(run: &'a str, acronym: &str) -> &'a str {
    let word_starts = run.char_indices().filter(|&(i, c)| {
        !c.is_whitespace() && run[..i].chars().next_back().is_none_or(char::is_whitespace)
    });
    let starts: Vec<usize> = word_starts.map(|(i, _)| i).collect();

    for &start in starts.iter().rev() {
        let suffix = &run[start..];
        if suffix.split_whitespace().next().is_some_and(is_connector) {
            continue;
        }
        let initials: String = suffix
            .split_whitespace()
            .filter(|word| !is_connector(word))
            .filter_map(|word| word.chars().next())
            .collect();
        if initials == acronym {
            return suffix;
        }
    }
    run
}

/// Dictionary expansion for `acronym`, if it has one.
#[must_use]
pub fn expected_definition(acronym: &str) -> Option<&'static str> {
    ACRONYM_DICTIONARY
        .iter()
        .find(|(candidate, _)| *candidate == acronym)
        .map(|(_, expansion)| *expansion)
}

fn normalize_definition(text: &str) -> String {
    normalize_surface(&text.replace('-', ""))
}

/// Whether two expansions are equivalent: equal after normalization, one
/// contained in the other, or a known synonym pair.
#[must_use]
pub fn definitions_match(left: &str, right: &str) -> bool {
    let left = normalize_definition(left);
    let right = normalize_definition(right);
    if left == right {
        return true;
    }
    if left.is_empty() || right.is_empty() {
        return false;
    }
    if left.contains(&right) || right.contains(&left) {
        return true;
    }
    DEFINITION_SYNONYMS
        .iter()
        .any(|&(a, b)| (left == a && right == b) || (left == b && right == a))
}

/// An acronym used repeatedly without ever being defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndefinedAcronym {
    /// The acronym.
    pub acronym: String,
    /// Line of the first use.
    pub first_use_line: usize,
    /// Trimmed text of the first-use line.
    pub context: String,
    /// Number of uses in the document.
    pub total_uses: usize,
    /// Dictionary expansion, if known.
    pub suggested_definition: Option<String>,
}

/// A definition that disagrees with the expected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InconsistentDefinition {
    /// The acronym.
    pub acronym: String,
    /// Expansion written in the document.
    pub found_definition: String,
    /// Document's first definition, or the dictionary's for that first definition.
    pub expected_definition: String,
    /// Line of the offending definition.
    pub line: usize,
    /// Trimmed text of that line.
    pub context: String,
}

/// Acronym result for one document.
#[derive(Debug, Clone, Serialize)]
pub struct AcronymFileReport {
    /// Source file.
    pub file: PathBuf,
    /// `false` once `errors` is non-empty.
    pub valid: bool,
    /// Read failure, if the file could not be checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every acronym use; `translation` holds the expansion when one was given.
    pub acronyms_found: Vec<TermOccurrence>,
    /// Acronyms used 2+ times and never defined.
    pub undefined_acronyms: Vec<UndefinedAcronym>,
    /// Definitions that disagree with the expected expansion.
    pub inconsistent_definitions: Vec<InconsistentDefinition>,
    /// Error messages, one per error-severity finding.
    pub errors: Vec<String>,
    /// Best-practice messages.
    pub warnings: Vec<String>,
}

impl FileOutcome for AcronymFileReport {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn error_count(&self) -> usize {
        self.errors.len()
    }

    fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Directory counters for an acronym run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AcronymSummary {
    /// Files checked (including unreadable ones).
    pub total_files: usize,
    /// Files without errors.
    pub valid_files: usize,
    /// Files with errors.
    pub invalid_files: usize,
    /// Files using at least one acronym.
    pub files_with_acronyms: usize,
    /// Acronym uses across all files.
    pub total_acronyms: usize,
    /// Distinct acronyms, sorted.
    pub unique_acronyms: BTreeSet<String>,
    /// Number of distinct acronyms.
    pub unique_acronyms_count: usize,
    /// Undefined-acronym findings.
    pub total_undefined_acronyms: usize,
    /// Inconsistent-definition findings.
    pub total_inconsistent_definitions: usize,
    /// Error messages across all files.
    pub total_errors: usize,
    /// Warning messages across all files.
    pub total_warnings: usize,
}

/// Acronym validator.
#[derive(Debug, Clone)]
pub struct AcronymValidator {
    skip: HashSet<String>,
}

impl Default for AcronymValidator {
    fn default() -> Self {
        Self::new(&LintConfig::default())
    }
}

impl AcronymValidator {
    /// Validator with the built-in skip-list plus `config.extra_skip_acronyms`.
    #[must_use]
    pub fn new(config: &LintConfig) -> Self {
        let skip = SKIP_ACRONYMS
            .iter()
            .map(|a| (*a).to_owned())
            .chain(config.extra_skip_acronyms.iter().cloned())
            .collect();
        Self { skip }
    }

    /// Whether `token` is an acronym this validator cares about.
    #[must_use]
    pub fn is_checked_acronym(&self, token: &str) -> bool {
        let len = token.chars().count();
        (2..=MAX_ACRONYM_CHARS).contains(&len)
            && token.chars().all(|c| c.is_ascii_uppercase())
            && !self.skip.contains(token)
            && !ROMAN_NUMERAL.is_match(token)
    }

    /// Every acronym use in `content`, in line order.
    ///
    /// On each line, definitions are collected first; a bare use of an
    /// acronym already defined on the same line is not recorded again.
    #[must_use]
    pub fn extract(&self, content: &str, path: &Path) -> Vec<TermOccurrence> {
        let mut found = Vec::new();
        for (line_number, line) in prose_lines(content) {
            let at = |offset: usize| Location {
                file: path,
                line: line_number,
                column: column_of(line, offset),
                context: line,
            };

            let mut defined_here: HashSet<&str> = HashSet::new();
            let mut line_uses = Vec::new();
            for caps in ACRONYM_THEN_DEFINITION.captures_iter(line) {
                let (Some(acronym), Some(definition)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                self.push_definition(acronym, definition.as_str(), &at, &mut defined_here, &mut line_uses);
            }
            for caps in DEFINITION_THEN_ACRONYM.captures_iter(line) {
                let (Some(definition), Some(acronym)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let definition = fit_expansion(definition.as_str(), acronym.as_str());
                self.push_definition(acronym, definition, &at, &mut defined_here, &mut line_uses);
            }
            for mat in STANDALONE_ACRONYM.find_iter(line) {
                let token = mat.as_str();
                if self.is_checked_acronym(token) && !defined_here.contains(token) {
                    line_uses.push(TermOccurrence::new(
                        token,
                        None,
                        &at(mat.start()),
                        ExtractionPattern::Acronym,
                    ));
                }
            }

            line_uses.sort_by_key(|occ| occ.column);
            found.append(&mut line_uses);
        }
        found
    }

    fn push_definition<'l, F>(
        &self,
        acronym: regex::Match<'l>,
        definition: &str,
        at: &F,
        defined_here: &mut HashSet<&'l str>,
        out: &mut Vec<TermOccurrence>,
    ) where
        F: Fn(usize) -> Location<'l>,
    {
        let definition = definition.trim();
        // `EU (2024)` is a year, not an expansion.
        if !self.is_checked_acronym(acronym.as_str())
            || !definition.chars().any(char::is_alphabetic)
        {
            return;
        }
        defined_here.insert(acronym.as_str());
        out.push(TermOccurrence::new(
            acronym.as_str(),
            Some(definition),
            &at(acronym.start()),
            ExtractionPattern::AcronymDefinition,
        ));
    }
}

/// Group uses per acronym and record undefined, inconsistent and
/// best-practice findings.
fn check_uses(uses: &[TermOccurrence], report: &mut AcronymFileReport) {
    let mut groups: BTreeMap<&str, Vec<&TermOccurrence>> = BTreeMap::new();
    for occurrence in uses {
        groups.entry(occurrence.raw_text.as_str()).or_default().push(occurrence);
    }

    for (acronym, mut group) in groups {
        group.sort_by_key(|occ| (occ.line, occ.column));
        let definitions: Vec<&TermOccurrence> =
            group.iter().copied().filter(|occ| occ.translation.is_some()).collect();
        let bare: Vec<&TermOccurrence> =
            group.iter().copied().filter(|occ| occ.translation.is_none()).collect();

        if let Some(&first_definition) = definitions.first() {
            check_definitions(acronym, &definitions, report);
            if let Some(first_use) = bare.first()
                && (first_use.line, first_use.column)
                    < (first_definition.line, first_definition.column)
            {
                report.warnings.push(format!(
                    "Acronym '{acronym}' used before definition (first use: line {}, definition: line {})",
                    first_use.line, first_definition.line
                ));
            }
            continue;
        }

        let first_use = group[0];
        let suggestion = expected_definition(acronym);
        if group.len() >= 2 {
            report.undefined_acronyms.push(UndefinedAcronym {
                acronym: acronym.to_owned(),
                first_use_line: first_use.line,
                context: first_use.context.clone(),
                total_uses: group.len(),
                suggested_definition: suggestion.map(str::to_owned),
            });
        } else if let Some(suggestion) = suggestion {
            report.warnings.push(format!(
                "Line {}: Acronym '{acronym}' used without definition (suggested: '{suggestion}')",
                first_use.line
            ));
        }
        if bare.len() > NEVER_DEFINED_WARNING_THRESHOLD {
            report.warnings.push(format!(
                "Acronym '{acronym}' used {} times but never defined",
                bare.len()
            ));
        }
    }

    report
        .inconsistent_definitions
        .sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.acronym.cmp(&b.acronym)));

    for undefined in &report.undefined_acronyms {
        report.errors.push(format!(
            "Line {}: Acronym '{}' used without definition",
            undefined.first_use_line, undefined.acronym
        ));
    }
    for inconsistent in &report.inconsistent_definitions {
        report.errors.push(format!(
            "Line {}: Inconsistent definition for '{}' (found: '{}', expected: '{}')",
            inconsistent.line,
            inconsistent.acronym,
            inconsistent.found_definition,
            inconsistent.expected_definition
        ));
    }
}

/// Compare the first definition with the dictionary and every later one
/// with the first.
fn check_definitions(acronym: &str, definitions: &[&TermOccurrence], report: &mut AcronymFileReport) {
    let mut expected_for_first = expected_definition(acronym);
    let mut reference: Option<&str> = None;
    for occurrence in definitions {
        let Some(found) = occurrence.translation.as_deref() else {
            continue;
        };
        let expected = match reference {
            Some(first) => first,
            None => {
                reference = Some(found);
                match expected_for_first.take() {
                    Some(dictionary) => dictionary,
                    None => continue,
                }
            }
        };
        if !definitions_match(found, expected) {
            report.inconsistent_definitions.push(InconsistentDefinition {
                acronym: acronym.to_owned(),
                found_definition: found.to_owned(),
                expected_definition: expected.to_owned(),
                line: occurrence.line,
                context: occurrence.context.clone(),
            });
        }
    }
}

impl Validator for AcronymValidator {
    type FileReport = AcronymFileReport;
    type Summary = AcronymSummary;

    fn name(&self) -> &'static str {
        "acronyms"
    }

    fn glossary(&self) -> Option<&Glossary> {
        None
    }

    fn validate_document(&self, content: &str, path: &Path) -> AcronymFileReport {
        let acronyms_found = self.extract(content, path);
        let mut report = AcronymFileReport {
            file: path.to_path_buf(),
            valid: true,
            error: None,
            acronyms_found: Vec::new(),
            undefined_acronyms: Vec::new(),
            inconsistent_definitions: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        };
        check_uses(&acronyms_found, &mut report);
        report.acronyms_found = acronyms_found;
        report.valid = report.errors.is_empty();
        report
    }

    fn unreadable(&self, error: &ScanError) -> AcronymFileReport {
        AcronymFileReport {
            file: error.file.clone(),
            valid: false,
            error: Some(error.message.clone()),
            acronyms_found: Vec::new(),
            undefined_acronyms: Vec::new(),
            inconsistent_definitions: Vec::new(),
            errors: vec![format!("Failed to read file: {}", error.message)],
            warnings: Vec::new(),
        }
    }

    fn record(&self, accumulator: &mut UsageAccumulator, report: &AcronymFileReport) {
        for occurrence in &report.acronyms_found {
            if let Some(definition) = &occurrence.translation {
                accumulator.record(&occurrence.raw_text, definition, &occurrence.file);
            }
        }
    }

    fn summarize(&self, files: &[AcronymFileReport], _: &UsageAccumulator) -> AcronymSummary {
        let mut summary = AcronymSummary {
            total_files: files.len(),
            ..AcronymSummary::default()
        };
        for file in files {
            if file.valid {
                summary.valid_files += 1;
            } else {
                summary.invalid_files += 1;
            }
            if !file.acronyms_found.is_empty() {
                summary.files_with_acronyms += 1;
            }
            summary.total_acronyms += file.acronyms_found.len();
            summary
                .unique_acronyms
                .extend(file.acronyms_found.iter().map(|occ| occ.raw_text.clone()));
            summary.total_undefined_acronyms += file.undefined_acronyms.len();
            summary.total_inconsistent_definitions += file.inconsistent_definitions.len();
            summary.total_errors += file.errors.len();
            summary.total_warnings += file.warnings.len();
        }
        summary.unique_acronyms_count = summary.unique_acronyms.len();
        summary
    }

    fn canonical_form(&self, key: &str, _: &[String]) -> Option<String> {
        expected_definition(key).map(str::to_owned)
    }

    fn forms_agree(&self, forms: &[String]) -> bool {
        forms
            .iter()
            .enumerate()
            .all(|(i, a)| forms[i + 1..].iter().all(|b| definitions_match(a, b)))
    }
}
