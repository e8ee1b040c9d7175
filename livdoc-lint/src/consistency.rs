//! Within-document consistency checks.

use std::collections::{BTreeMap, BTreeSet};

use crate::glossary::{Glossary, GlossaryEntry};
use crate::occurrence::{ConsistencyFinding, FindingKind, GlossaryMismatch, TermOccurrence};

/// Group occurrences by normalized key, preserving document order within
/// each group. Keys iterate in sorted order.
#[must_use]
pub fn group_by_key(occurrences: &[TermOccurrence]) -> BTreeMap<&str, Vec<&TermOccurrence>> {
    let mut groups: BTreeMap<&str, Vec<&TermOccurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        groups
            .entry(occurrence.normalized_key.as_str())
            .or_default()
            .push(occurrence);
    }
    groups
}

/// Flag keys written with two or more distinct surface forms in one document.
///
/// Repetition of a single form is not a finding; only disagreement is.
#[must_use]
pub fn check_file(occurrences: &[TermOccurrence]) -> Vec<ConsistencyFinding> {
    group_by_key(occurrences)
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .filter_map(|(key, group)| {
            let forms: BTreeSet<&str> = group.iter().map(|occ| occ.raw_text.as_str()).collect();
            (forms.len() > 1).then(|| {
                ConsistencyFinding::new(
                    FindingKind::Inconsistency,
                    key,
                    group.into_iter().cloned().collect(),
                )
            })
        })
        .collect()
}

/// Resolve the glossary entry covering an occurrence.
///
/// Tries the raw text (exact key, lower-cased key, English gloss) and then
/// the normalized key, so variant phrasings resolve to their concept.
#[must_use]
pub fn glossary_entry_for<'g>(
    occurrence: &TermOccurrence,
    glossary: &'g Glossary,
) -> Option<&'g GlossaryEntry> {
    glossary
        .lookup(&occurrence.raw_text)
        .or_else(|| glossary.get(&occurrence.normalized_key))
}

/// Flag occurrences whose surface form differs from the glossary's
/// canonical and English forms. Terms the glossary does not cover are skipped.
#[must_use]
pub fn check_against_glossary(
    occurrences: &[TermOccurrence],
    glossary: &Glossary,
) -> Vec<GlossaryMismatch> {
    if glossary.is_empty() {
        return Vec::new();
    }
    occurrences
        .iter()
        .filter_map(|occurrence| {
            let entry = glossary_entry_for(occurrence, glossary)?;
            (!entry.accepts(&occurrence.raw_text)).then(|| {
                GlossaryMismatch::new(
                    occurrence,
                    &entry.canonical_term,
                    entry.english.as_deref(),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::{ExtractionPattern, Location};
    use std::path::Path;

    fn occ(raw: &str, line: usize) -> TermOccurrence {
        TermOccurrence::new(
            raw,
            None,
            &Location {
                file: Path::new("doc.md"),
                line,
                column: 1,
                context: raw,
            },
            ExtractionPattern::Bolded,
        )
    }

    const GLOSSARY: &str = "### CPR-nummer\n**English**: Civil Registration Number\n";

    #[test]
    fn test_single_occurrence_is_never_inconsistent() {
        assert!(check_file(&[occ("CPR number", 1)]).is_empty());
    }

    #[test]
    fn test_repeated_identical_form_is_fine() {
        assert!(check_file(&[occ("MitID", 1), occ("MitID", 5)]).is_empty());
    }

    #[test]
    fn test_two_forms_yield_exactly_one_finding() {
        let findings = check_file(&[
            occ("CPR number", 2),
            occ("MitID", 3),
            occ("cpr-nummer", 7),
            occ("CPR number", 9),
        ]);
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.normalized_key, "cpr-nummer");
        assert_eq!(finding.kind, FindingKind::Inconsistency);
        assert_eq!(finding.locations.len(), 3);
        assert!(finding.surface_forms.contains("CPR number"));
        assert!(finding.surface_forms.contains("cpr-nummer"));
    }

    #[test]
    fn test_glossary_accepts_canonical_and_english_any_case() {
        let glossary = Glossary::parse(GLOSSARY);
        let occurrences = [
            occ("cpr-NUMMER", 1),
            occ("civil registration number", 2),
            occ("Residence permit", 3),
        ];
        assert!(check_against_glossary(&occurrences, &glossary).is_empty());
    }

    #[test]
    fn test_variant_phrasing_is_a_glossary_mismatch() {
        let glossary = Glossary::parse(GLOSSARY);
        let mismatches = check_against_glossary(&[occ("CPR number", 4)], &glossary);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].found_term, "CPR number");
        assert_eq!(mismatches[0].canonical_term, "CPR-nummer");
        assert_eq!(
            mismatches[0].english_translation.as_deref(),
            Some("Civil Registration Number")
        );
        assert_eq!(mismatches[0].line(), 4);
    }

    #[test]
    fn test_no_glossary_no_mismatches() {
        assert!(check_against_glossary(&[occ("CPR number", 1)], &Glossary::empty()).is_empty());
    }
}
