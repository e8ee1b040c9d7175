//! Term extraction for the terminology checker.
//!
//! Four matchers run independently over every prose line, in this order:
//! bolded phrases, quoted phrases, `Term (translation)` pairs and known
//! glossary keys. Overlapping matches from different matchers are all kept.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::glossary::Glossary;
use crate::markdown::{column_of, prose_lines};
use crate::occurrence::{ExtractionPattern, Location, TermOccurrence};

/// Words ignored by the bolded and quoted matchers.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "you", "are", "can", "will", "this", "that",
];

/// Bolded and quoted matches shorter than this (in characters) are noise.
pub const MIN_TERM_CHARS: usize = 3;

/// Glossary keys this short are not worth matching in running text.
const MIN_GLOSSARY_KEY_CHARS: usize = 3;

static BOLDED_PATTERN: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"\*\*([^*]+)\*\*") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid bolded regex: {err}"),
});

static QUOTED_PATTERN: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r#""([^"]+)""#) {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid quoted regex: {err}"),
});

/// A capitalised phrase (Danish letters allowed) directly followed by a
/// parenthesised gloss: `Boligstøtte (housing benefit)`.
pub static WITH_TRANSLATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(concat!(
        r"\b([A-Z\x{C6}\x{D8}\x{C5}][a-z\x{E6}\x{F8}\x{E5}-]+", // capitalised first word
        r"(?:\s+[a-z\x{E6}\x{F8}\x{E5}-]+)*)",                  // lower-case continuation
        r"\s*\(([^)]+)\)",                                      // (translation)
    )) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid translation regex: {err}"),
    }
});

/// Build a case-insensitive alternation over all glossary keys longer than
/// two characters, longest first so a short key never shadows a longer one.
///
/// Returns `None` when the glossary has no usable keys.
#[must_use]
pub fn glossary_pattern(glossary: &Glossary) -> Option<Regex> {
    known_terms_pattern(glossary.keys())
}

/// Whole-word, case-insensitive alternation over `terms`, longest first.
#[must_use]
pub fn known_terms_pattern<'a, I>(terms: I) -> Option<Regex>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keys: Vec<String> = terms
        .into_iter()
        .filter(|key| key.chars().count() >= MIN_GLOSSARY_KEY_CHARS)
        .map(str::to_lowercase)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    if keys.is_empty() {
        return None;
    }
    keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

    let alternation = keys
        .iter()
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");
    match RegexBuilder::new(&format!(r"\b({alternation})\b"))
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(keys = keys.len(), error = %err, "known-term matcher disabled");
            None
        }
    }
}

/// Extracts term occurrences from document text.
#[derive(Debug, Clone)]
pub struct TermExtractor {
    glossary_pattern: Option<Regex>,
    stop_words: HashSet<String>,
}

impl TermExtractor {
    /// Extractor with the glossary matcher enabled when `glossary` has keys.
    #[must_use]
    pub fn new(glossary: &Glossary) -> Self {
        Self {
            glossary_pattern: glossary_pattern(glossary),
            stop_words: STOP_WORDS.iter().map(|w| (*w).to_owned()).collect(),
        }
    }

    /// Add words to the stop-word list.
    #[must_use]
    pub fn with_stop_words(mut self, words: &[String]) -> Self {
        self.stop_words
            .extend(words.iter().map(|word| word.to_lowercase()));
        self
    }

    /// Extract every occurrence in `content`, attributing them to `path`.
    #[must_use]
    pub fn extract(&self, content: &str, path: &Path) -> Vec<TermOccurrence> {
        let mut terms = Vec::new();
        for (line_number, line) in prose_lines(content) {
            self.extract_line(line, line_number, path, &mut terms);
        }
        terms
    }

    fn extract_line(
        &self,
        line: &str,
        line_number: usize,
        path: &Path,
        out: &mut Vec<TermOccurrence>,
    ) {
        let at = |offset: usize| Location {
            file: path,
            line: line_number,
            column: column_of(line, offset),
            context: line,
        };

        for (pattern, kind) in [
            (&*BOLDED_PATTERN, ExtractionPattern::Bolded),
            (&*QUOTED_PATTERN, ExtractionPattern::Quoted),
        ] {
            for caps in pattern.captures_iter(line) {
                let Some(term) = caps.get(1) else { continue };
                let text = term.as_str().trim();
                if self.is_noise(text) {
                    continue;
                }
                out.push(TermOccurrence::new(text, None, &at(term.start()), kind));
            }
        }

        for caps in WITH_TRANSLATION_PATTERN.captures_iter(line) {
            let (Some(term), Some(translation)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            out.push(TermOccurrence::new(
                term.as_str().trim(),
                Some(translation.as_str().trim()),
                &at(term.start()),
                ExtractionPattern::WithTranslation,
            ));
        }

        if let Some(pattern) = &self.glossary_pattern {
            for mat in pattern.find_iter(line) {
                out.push(TermOccurrence::new(
                    mat.as_str().trim(),
                    None,
                    &at(mat.start()),
                    ExtractionPattern::GlossaryTerm,
                ));
            }
        }
    }

    fn is_noise(&self, text: &str) -> bool {
        text.chars().count() < MIN_TERM_CHARS || self.stop_words.contains(&text.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOSSARY: &str = "### CPR-nummer\n**English**: Civil Registration Number\n\n\
        ### CPR\n**English**: CPR\n\n\
        ### NemKonto\n**English**: Easy Account\n";

    fn extract(content: &str, glossary: &Glossary) -> Vec<TermOccurrence> {
        TermExtractor::new(glossary).extract(content, Path::new("doc.md"))
    }

    fn summary(terms: &[TermOccurrence]) -> Vec<(ExtractionPattern, &str)> {
        terms
            .iter()
            .map(|t| (t.pattern, t.raw_text.as_str()))
            .collect()
    }

    #[test]
    fn test_bolded_and_quoted() {
        let terms = extract(
            "Get your **tax card** and a \"health insurance card\" soon.",
            &Glossary::empty(),
        );
        assert_eq!(
            summary(&terms),
            vec![
                (ExtractionPattern::Bolded, "tax card"),
                (ExtractionPattern::Quoted, "health insurance card"),
            ]
        );
        assert_eq!(terms[0].normalized_key, "skattekort");
        assert_eq!(terms[1].column, 30);
    }

    #[test]
    fn test_short_and_stop_words_filtered() {
        let terms = extract("**ok** and \"the\" and **This**", &Glossary::empty());
        assert!(terms.is_empty(), "got {terms:?}");
    }

    #[test]
    fn test_translation_pair_is_exempt_from_filters() {
        let terms = extract("Apply for Moms (VAT) today.", &Glossary::empty());
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].raw_text, "Moms");
        assert_eq!(terms[0].translation.as_deref(), Some("VAT"));
        assert_eq!(terms[0].pattern, ExtractionPattern::WithTranslation);
    }

    #[test]
    fn test_danish_letters_in_translation_pair() {
        let terms = extract("Boligst\u{f8}tte (housing benefit) is paid monthly.", &Glossary::empty());
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].raw_text, "Boligst\u{f8}tte");
        assert_eq!(terms[0].normalized_key, "boligst\u{f8}tte");
    }

    #[test]
    fn test_overlapping_matches_are_all_recorded() {
        let glossary = Glossary::parse(GLOSSARY);
        let terms = extract("Your **CPR-nummer** is needed.", &glossary);
        assert_eq!(
            summary(&terms),
            vec![
                (ExtractionPattern::Bolded, "CPR-nummer"),
                (ExtractionPattern::GlossaryTerm, "CPR-nummer"),
            ]
        );
    }

    #[test]
    fn test_glossary_alternation_prefers_longest_key() {
        let glossary = Glossary::parse(GLOSSARY);
        let terms = extract("Bring the cpr-nummer and your nemkonto details.", &glossary);
        assert_eq!(
            summary(&terms),
            vec![
                (ExtractionPattern::GlossaryTerm, "cpr-nummer"),
                (ExtractionPattern::GlossaryTerm, "nemkonto"),
            ]
        );
    }

    #[test]
    fn test_structural_lines_are_skipped() {
        let content = "# **Heading term**\n```\n**code term**\n```\n---\nhttp://x.dk/\"quoted\"\nBody **real term**";
        let terms = extract(content, &Glossary::empty());
        assert_eq!(summary(&terms), vec![(ExtractionPattern::Bolded, "real term")]);
        assert_eq!(terms[0].line, 7);
    }

    #[test]
    fn test_extra_stop_words() {
        let extractor =
            TermExtractor::new(&Glossary::empty()).with_stop_words(&["Note".to_owned()]);
        let terms = extractor.extract("**Note** about **MitID**", Path::new("doc.md"));
        assert_eq!(summary(&terms), vec![(ExtractionPattern::Bolded, "MitID")]);
    }
}
