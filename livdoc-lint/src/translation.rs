//! Danish terms must carry an English translation.
//!
//! A term "looks Danish" when it contains æ/ø/å, ends in a common Danish
//! suffix, is a known seed word, or is a longer hyphenated compound. Such
//! terms are expected to appear as `**term** (translation)` or
//! `Term (translation)` somewhere in the same document; translations are
//! compared with the glossary's English gloss when a glossary is loaded.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::warn;

use crate::aggregate::UsageAccumulator;
use crate::consistency::{glossary_entry_for, group_by_key};
use crate::error::ScanError;
use crate::extract::{WITH_TRANSLATION_PATTERN, known_terms_pattern};
use crate::glossary::Glossary;
use crate::markdown::{column_of, prose_lines};
use crate::normalize::normalize_surface;
use crate::occurrence::{ExtractionPattern, Location, TermOccurrence};
use crate::validator::{FileOutcome, Validator};

const DANISH_LETTERS: &[char] = &[
    '\u{e6}', '\u{f8}', '\u{e5}', '\u{c6}', '\u{d8}', '\u{c5}',
];

/// Endings typical of Danish compound nouns.
pub const DANISH_SUFFIXES: &[&str] = &[
    "-nummer",
    "kort",
    "skat",
    "st\u{f8}tte",
    "penge",
    "konto",
    "bidrag",
    "forsikring",
];

/// Danish words common enough in the documentation to recognise outright.
pub const DANISH_SEED_WORDS: &[&str] = &[
    "borger",
    "skat",
    "kommune",
    "arbejde",
    "bolig",
    "sundhed",
    "pension",
    "dagpenge",
    "kontanthj\u{e6}lp",
    "barsel",
    "mitid",
    "nemkonto",
    "lejekontrakt",
    "depositum",
    "moms",
    "\u{e5}rsopg\u{f8}relse",
];

/// Translations that mean the same thing despite different wording.
const TRANSLATION_SYNONYMS: &[(&str, &str)] = &[
    ("civil registration number", "personal identification number"),
    ("unemployment benefits", "unemployment insurance"),
    ("housing benefits", "housing support"),
    ("tax card", "tax deduction card"),
];

/// Hyphenated terms longer than this are treated as Danish compounds.
const MIN_HYPHENATED_CHARS: usize = 5;

static BOLDED_WITH_TRANSLATION: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"\*\*([^*]+)\*\*\s*\(([^)]+)\)") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid bolded translation regex: {err}"),
    });

static FILLER_WORDS: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"\b(?:the|a|an|and|or)\b") {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid filler word regex: {err}"),
    });

/// Whether `term` looks like a Danish word or phrase.
#[must_use]
pub fn looks_danish(term: &str) -> bool {
    if term.contains(DANISH_LETTERS) {
        return true;
    }
    let lowered = term.to_lowercase();
    if DANISH_SUFFIXES.iter().any(|suffix| lowered.ends_with(suffix)) {
        return true;
    }
    if DANISH_SEED_WORDS.contains(&lowered.as_str()) {
        return true;
    }
    term.contains('-') && term.chars().count() > MIN_HYPHENATED_CHARS
}

fn normalize_translation(text: &str) -> String {
    normalize_surface(&FILLER_WORDS.replace_all(&text.to_lowercase(), ""))
}

/// Whether two translations are equivalent: equal once articles and
/// punctuation are dropped, one contained in the other, or a known synonym pair.
#[must_use]
pub fn translations_match(found: &str, expected: &str) -> bool {
    let found_lower = found.trim().to_lowercase();
    let expected_lower = expected.trim().to_lowercase();
    if found_lower == expected_lower {
        return true;
    }
    let found = normalize_translation(&found_lower);
    let expected = normalize_translation(&expected_lower);
    if found == expected {
        return true;
    }
    if found.is_empty() || expected.is_empty() {
        return false;
    }
    if found.contains(&expected) || expected.contains(&found) {
        return true;
    }
    TRANSLATION_SYNONYMS
        .iter()
        .any(|&(a, b)| (found == a && expected == b) || (found == b && expected == a))
}

/// A Danish term with no translation anywhere in its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingTranslation {
    /// Term as written.
    pub term: String,
    /// Line of the untranslated use.
    pub line: usize,
    /// Trimmed text of that line.
    pub context: String,
}

/// A translation that disagrees with the glossary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InconsistentTranslation {
    /// Term as written.
    pub term: String,
    /// Translation given in the document.
    pub found_translation: String,
    /// Glossary English gloss.
    pub expected_translation: String,
    /// Line of the translation.
    pub line: usize,
    /// Trimmed text of that line.
    pub context: String,
}

/// One term given translations that disagree within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationConflict {
    /// Shared normalized key.
    pub normalized_term: String,
    /// Distinct translations, sorted.
    pub translations: BTreeSet<String>,
    /// Lines carrying a translation.
    pub lines: Vec<usize>,
}

/// A translated term the glossary does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownTerm {
    /// Term as written.
    pub term: String,
    /// Translation given in the document.
    pub translation: String,
    /// Line of the use.
    pub line: usize,
    /// Trimmed text of that line.
    pub context: String,
}

/// Translation result for one document.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationFileReport {
    /// Source file.
    pub file: PathBuf,
    /// `false` once `errors` is non-empty.
    pub valid: bool,
    /// Read failure, if the file could not be checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every Danish term use.
    pub danish_terms_found: Vec<TermOccurrence>,
    /// Terms never translated in the document.
    pub missing_translations: Vec<MissingTranslation>,
    /// Translations disagreeing with the glossary.
    pub inconsistent_translations: Vec<InconsistentTranslation>,
    /// Terms translated two different ways in the document.
    pub conflicting_translations: Vec<TranslationConflict>,
    /// Translated terms missing from the glossary.
    pub unknown_terms: Vec<UnknownTerm>,
    /// Error messages, one per error-severity finding.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
}

impl FileOutcome for TranslationFileReport {
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

/// Directory counters for a translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationSummary {
    /// Files checked (including unreadable ones).
    pub total_files: usize,
    /// Files without errors.
    pub valid_files: usize,
    /// Files with errors.
    pub invalid_files: usize,
    /// Files using at least one Danish term.
    pub files_with_danish_terms: usize,
    /// Danish term uses across all files.
    pub total_danish_terms: usize,
    /// Distinct translated terms (normalized) across all files.
    pub unique_translated_terms: usize,
    /// Missing-translation findings.
    pub total_missing_translations: usize,
    /// Glossary disagreement findings.
    pub total_inconsistent_translations: usize,
    /// Within-document conflicts.
    pub total_conflicting_translations: usize,
    /// Translated terms unknown to the glossary.
    pub total_unknown_terms: usize,
    /// Error messages across all files.
    pub total_errors: usize,
    /// Warning messages across all files.
    pub total_warnings: usize,
}

/// Danish term translation validator.
#[derive(Debug, Clone)]
pub struct TranslationValidator {
    glossary: Glossary,
    known_terms: Option<Regex>,
}

impl TranslationValidator {
    /// Validator bound to `glossary`. Without one, glossary terms are not
    /// searched for and no glossary comparison happens.
    #[must_use]
    pub fn new(glossary: Glossary) -> Self {
        let known_terms = known_terms_pattern(
            glossary
                .entries()
                .iter()
                .map(|entry| entry.canonical_term.as_str()),
        );
        Self {
            glossary,
            known_terms,
        }
    }

    /// Every Danish term use in `content`, line by line.
    #[must_use]
    pub fn extract(&self, content: &str, path: &Path) -> Vec<TermOccurrence> {
        let mut found: Vec<TermOccurrence> = Vec::new();
        for (line_number, line) in prose_lines(content) {
            let at = |offset: usize| Location {
                file: path,
                line: line_number,
                column: column_of(line, offset),
                context: line,
            };
            let line_start = found.len();
            let seen_on_line = |found: &[TermOccurrence], term: &str| {
                let term = term.to_lowercase();
                found[line_start..]
                    .iter()
                    .any(|occ| occ.raw_text.to_lowercase() == term)
            };

            for caps in BOLDED_WITH_TRANSLATION.captures_iter(line) {
                let (Some(term), Some(translation)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let text = term.as_str().trim();
                if looks_danish(text) {
                    found.push(TermOccurrence::new(
                        text,
                        Some(translation.as_str().trim()),
                        &at(term.start()),
                        ExtractionPattern::BoldedWithTranslation,
                    ));
                }
            }

            for caps in WITH_TRANSLATION_PATTERN.captures_iter(line) {
                let (Some(term), Some(translation)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                let text = term.as_str().trim();
                if !seen_on_line(&found, text) && looks_danish(text) {
                    found.push(TermOccurrence::new(
                        text,
                        Some(translation.as_str().trim()),
                        &at(term.start()),
                        ExtractionPattern::UnboldedWithTranslation,
                    ));
                }
            }

            if let Some(pattern) = &self.known_terms {
                for mat in pattern.find_iter(line) {
                    let text = mat.as_str();
                    let translated_here = line.contains(&format!("({text})"))
                        || line.contains(&format!("**{text}**"))
                        || seen_on_line(&found, text);
                    if !translated_here {
                        found.push(TermOccurrence::new(
                            text,
                            None,
                            &at(mat.start()),
                            ExtractionPattern::GlossaryTermNoTranslation,
                        ));
                    }
                }
            }
        }
        found
    }

    fn check_terms(&self, content: &str, terms: &[TermOccurrence], report: &mut TranslationFileReport) {
        // Fallbacks match case-insensitively, so one lookup per folded term.
        let mut translated: HashMap<String, bool> = HashMap::new();
        for occurrence in terms.iter().filter(|occ| occ.translation.is_none()) {
            let is_translated = *translated
                .entry(occurrence.raw_text.to_lowercase())
                .or_insert_with(|| translated_elsewhere(content, &occurrence.raw_text));
            if !is_translated {
                report.missing_translations.push(MissingTranslation {
                    term: occurrence.raw_text.clone(),
                    line: occurrence.line,
                    context: occurrence.context.clone(),
                });
            }
        }

        if !self.glossary.is_empty() {
            for occurrence in terms {
                let Some(found) = occurrence.translation.as_deref() else {
                    continue;
                };
                let Some(entry) = glossary_entry_for(occurrence, &self.glossary) else {
                    report.unknown_terms.push(UnknownTerm {
                        term: occurrence.raw_text.clone(),
                        translation: found.to_owned(),
                        line: occurrence.line,
                        context: occurrence.context.clone(),
                    });
                    continue;
                };
                if let Some(expected) = entry.english.as_deref()
                    && !translations_match(found, expected)
                {
                    report.inconsistent_translations.push(InconsistentTranslation {
                        term: occurrence.raw_text.clone(),
                        found_translation: found.to_owned(),
                        expected_translation: expected.to_owned(),
                        line: occurrence.line,
                        context: occurrence.context.clone(),
                    });
                }
            }
        }

        report.conflicting_translations = find_conflicts(terms);

        for missing in &report.missing_translations {
            report.errors.push(format!(
                "Line {}: Danish term '{}' missing English translation",
                missing.line, missing.term
            ));
        }
        for inconsistent in &report.inconsistent_translations {
            report.errors.push(format!(
                "Line {}: Translation for '{}' ('{}') differs from glossary ('{}')",
                inconsistent.line,
                inconsistent.term,
                inconsistent.found_translation,
                inconsistent.expected_translation
            ));
        }
        for conflict in &report.conflicting_translations {
            let translations: Vec<&str> = conflict.translations.iter().map(String::as_str).collect();
            report.errors.push(format!(
                "Line {}: '{}' translated inconsistently: {}",
                conflict.lines.first().copied().unwrap_or_default(),
                conflict.normalized_term,
                translations.join(" / ")
            ));
        }
        for unknown in &report.unknown_terms {
            report.warnings.push(format!(
                "Line {}: Danish term '{}' not found in glossary",
                unknown.line, unknown.term
            ));
        }
    }
}

/// The three whole-document fallbacks: `**term** (…)`, `term (…)`, and
/// `term … english: …`, as one case-insensitive alternation.
fn translated_elsewhere(content: &str, term: &str) -> bool {
    let escaped = regex::escape(term);
    let pattern = format!(
        r"\*\*{escaped}\*\*\s*\([^)]+\)|{escaped}\s*\([^)]+\)|{escaped}.*?english[:\s]+[^.\n]+"
    );
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => regex.is_match(content),
        Err(err) => {
            warn!(term, error = %err, "translation fallback pattern could not be built");
            false
        }
    }
}

/// Terms whose translations within one document do not all match the first.
fn find_conflicts(terms: &[TermOccurrence]) -> Vec<TranslationConflict> {
    let translated: Vec<TermOccurrence> = terms
        .iter()
        .filter(|occ| occ.translation.is_some())
        .cloned()
        .collect();
    group_by_key(&translated)
        .into_iter()
        .filter_map(|(key, group)| {
            let translations: Vec<&str> =
                group.iter().filter_map(|occ| occ.translation.as_deref()).collect();
            let first = translations.first()?;
            translations
                .iter()
                .any(|other| !translations_match(other, first))
                .then(|| TranslationConflict {
                    normalized_term: key.to_owned(),
                    translations: translations.iter().map(|t| (*t).to_owned()).collect(),
                    lines: group.iter().map(|occ| occ.line).collect(),
                })
        })
        .collect()
}

impl Validator for TranslationValidator {
    type FileReport = TranslationFileReport;
    type Summary = TranslationSummary;

    fn name(&self) -> &'static str {
        "translations"
    }

    fn glossary(&self) -> Option<&Glossary> {
        Some(&self.glossary)
    }

    fn validate_document(&self, content: &str, path: &Path) -> TranslationFileReport {
        let danish_terms_found = self.extract(content, path);
        let mut report = TranslationFileReport {
            file: path.to_path_buf(),
            valid: true,
            error: None,
            danish_terms_found: Vec::new(),
            missing_translations: Vec::new(),
            inconsistent_translations: Vec::new(),
            conflicting_translations: Vec::new(),
            unknown_terms: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        };
        self.check_terms(content, &danish_terms_found, &mut report);
        report.danish_terms_found = danish_terms_found;
        report.valid = report.errors.is_empty();
        report
    }

    fn unreadable(&self, error: &ScanError) -> TranslationFileReport {
        TranslationFileReport {
            file: error.file.clone(),
            valid: false,
            error: Some(error.message.clone()),
            danish_terms_found: Vec::new(),
            missing_translations: Vec::new(),
            inconsistent_translations: Vec::new(),
            conflicting_translations: Vec::new(),
            unknown_terms: Vec::new(),
            errors: vec![format!("Failed to read file: {}", error.message)],
            warnings: Vec::new(),
        }
    }

    fn record(&self, accumulator: &mut UsageAccumulator, report: &TranslationFileReport) {
        for occurrence in &report.danish_terms_found {
            if let Some(translation) = &occurrence.translation {
                accumulator.record(&occurrence.normalized_key, translation, &occurrence.file);
            }
        }
    }

    fn summarize(
        &self,
        files: &[TranslationFileReport],
        accumulator: &UsageAccumulator,
    ) -> TranslationSummary {
        let mut summary = TranslationSummary {
            total_files: files.len(),
            unique_translated_terms: accumulator.unique_keys(),
            ..TranslationSummary::default()
        };
        for file in files {
            if file.valid {
                summary.valid_files += 1;
            } else {
                summary.invalid_files += 1;
            }
            if !file.danish_terms_found.is_empty() {
                summary.files_with_danish_terms += 1;
            }
            summary.total_danish_terms += file.danish_terms_found.len();
            summary.total_missing_translations += file.missing_translations.len();
            summary.total_inconsistent_translations += file.inconsistent_translations.len();
            summary.total_conflicting_translations += file.conflicting_translations.len();
            summary.total_unknown_terms += file.unknown_terms.len();
            summary.total_errors += file.errors.len();
            summary.total_warnings += file.warnings.len();
        }
        summary
    }

    fn canonical_form(&self, key: &str, _: &[String]) -> Option<String> {
        self.glossary
            .get(key)
            .or_else(|| self.glossary.lookup(key))
            .and_then(|entry| entry.english.clone())
    }

    fn forms_agree(&self, forms: &[String]) -> bool {
        forms
            .iter()
            .enumerate()
            .all(|(i, a)| forms[i + 1..].iter().all(|b| translations_match(a, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOSSARY: &str = "### Boligst\u{f8}tte\n**English**: Housing Benefit\n\n\
        ### Dagpenge\n**English**: Unemployment Benefits\n";

    fn validate(content: &str, glossary: &str) -> TranslationFileReport {
        TranslationValidator::new(Glossary::parse(glossary)).validate_document(content, Path::new("doc.md"))
    }

    #[test]
    fn test_looks_danish() {
        assert!(looks_danish("Boligst\u{f8}tte"));
        assert!(looks_danish("CPR-nummer"));
        assert!(looks_danish("Skattekort"));
        assert!(looks_danish("MitID"));
        assert!(looks_danish("AM-bidrag"));
        assert!(looks_danish("check-in"));
        assert!(!looks_danish("Important"));
        assert!(!looks_danish("e-ID"));
    }

    #[test]
    fn test_bolded_term_with_matching_translation() {
        let report = validate("**Boligst\u{f8}tte** (housing benefit) is paid monthly.\n", GLOSSARY);
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(report.danish_terms_found.len(), 1);
        assert_eq!(
            report.danish_terms_found[0].pattern,
            ExtractionPattern::BoldedWithTranslation
        );
    }

    #[test]
    fn test_english_terms_are_not_extracted() {
        let report = validate("**Important** (read first) and Note (optional).\n", GLOSSARY);
        assert!(report.danish_terms_found.is_empty());
    }

    #[test]
    fn test_untranslated_glossary_term_is_missing() {
        let report = validate("Apply for boligst\u{f8}tte online.\n", GLOSSARY);
        assert_eq!(report.missing_translations.len(), 1);
        assert_eq!(report.missing_translations[0].line, 1);
        assert!(!report.valid);
    }

    #[test]
    fn test_translation_elsewhere_in_document_satisfies_fallback() {
        let doc = "Apply for boligst\u{f8}tte online.\n\nBoligst\u{f8}tte (housing benefit) depends on rent.\n";
        let report = validate(doc, GLOSSARY);
        assert!(report.missing_translations.is_empty());
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_repeated_term_resolves_fallback_once_per_folded_form() {
        let untranslated = "Dagpenge first.\n\nThen dagpenge again.\n\nDAGPENGE last.\n";
        let report = validate(untranslated, GLOSSARY);
        let lines: Vec<usize> = report.missing_translations.iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![1, 3, 5]);

        let translated = format!("{untranslated}\n**Dagpenge** (unemployment benefits) explained.\n");
        let report = validate(&translated, GLOSSARY);
        assert!(report.missing_translations.is_empty());
    }

    #[test]
    fn test_english_label_fallback() {
        let doc = "Dagpenge is paid by your a-kasse. In English: unemployment benefits.\n";
        let report = validate(doc, GLOSSARY);
        assert!(report.missing_translations.is_empty());
    }

    #[test]
    fn test_glossary_mismatch_and_synonym() {
        let report = validate("**Dagpenge** (sick pay) stops after a while.\n", GLOSSARY);
        assert_eq!(report.inconsistent_translations.len(), 1);
        assert_eq!(
            report.inconsistent_translations[0].expected_translation,
            "Unemployment Benefits"
        );

        let report = validate("**Dagpenge** (unemployment insurance) stops.\n", GLOSSARY);
        assert!(report.inconsistent_translations.is_empty());
    }

    #[test]
    fn test_unknown_term_is_a_warning() {
        let report = validate("**Lejekontrakt** (lease) must be signed.\n", GLOSSARY);
        assert!(report.valid);
        assert_eq!(report.unknown_terms.len(), 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_conflicting_translations_within_document() {
        let doc = "**Skattekort** (tax card) first.\n\n**Skattekort** (income statement) later.\n";
        let report = validate(doc, "");
        assert_eq!(report.conflicting_translations.len(), 1);
        assert_eq!(report.conflicting_translations[0].lines, vec![1, 3]);
        assert!(!report.valid);
    }

    #[test]
    fn test_translations_match() {
        assert!(translations_match("the housing benefit", "Housing Benefit"));
        assert!(translations_match("Housing Benefits", "housing support"));
        assert!(translations_match("tax card", "Tax Deduction Card"));
        assert!(!translations_match("sick pay", "Unemployment Benefits"));
    }
}
