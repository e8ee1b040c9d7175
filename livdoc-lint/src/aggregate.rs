//! Cross-document aggregation.
//!
//! A [`UsageAccumulator`] lives for exactly one directory run. Every checked
//! file records its `(key, form, file)` triples into it; once all files are
//! in, [`UsageAccumulator::finish`] reports the keys written in more than
//! one form. Ordered maps make the result independent of file order.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::occurrence::{Severity, TermOccurrence};

/// Per-key tallies: form → (count, files using it).
type FormTally = BTreeMap<String, (usize, BTreeSet<PathBuf>)>;

/// Accumulates term usage across the files of one run.
#[derive(Debug, Default)]
pub struct UsageAccumulator {
    usage: BTreeMap<String, FormTally>,
}

/// A key written in several forms across the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalInconsistency {
    /// Always `global_variation`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Always [`Severity::Error`].
    pub severity: Severity,
    /// Shared key.
    #[serde(rename = "normalized_term")]
    pub normalized_key: String,
    /// Distinct forms, sorted.
    pub variations: Vec<String>,
    /// Form → number of uses.
    pub usage_stats: BTreeMap<String, usize>,
    /// Form → files using it.
    pub file_usage: BTreeMap<String, BTreeSet<PathBuf>>,
    /// Form with the most uses (ties go to the smallest form).
    pub most_common: String,
    /// Authoritative form from the glossary or dictionary, if known.
    pub canonical_term: Option<String>,
    /// Suggested fix: `canonical_term` when known, else `most_common`.
    pub recommended: String,
    /// Uses across all forms.
    pub total_usage: usize,
}

impl UsageAccumulator {
    /// Fresh, empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one use of `form` under `key` in `file`.
    pub fn record(&mut self, key: &str, form: &str, file: &Path) {
        let (count, files) = self
            .usage
            .entry(key.to_owned())
            .or_default()
            .entry(form.to_owned())
            .or_default();
        *count += 1;
        files.insert(file.to_path_buf());
    }

    /// Record every occurrence under its normalized key and raw text.
    pub fn record_occurrences(&mut self, occurrences: &[TermOccurrence]) {
        for occurrence in occurrences {
            self.record(
                &occurrence.normalized_key,
                &occurrence.raw_text,
                &occurrence.file,
            );
        }
    }

    /// Number of distinct keys seen.
    #[must_use]
    pub fn unique_keys(&self) -> usize {
        self.usage.len()
    }

    /// Number of keys seen with more than one form.
    #[must_use]
    pub fn keys_with_variations(&self) -> usize {
        self.usage.values().filter(|forms| forms.len() > 1).count()
    }

    /// Close the run and report every key seen in two or more forms.
    ///
    /// `canonical` maps a key and its forms to the authoritative form, if
    /// one is known. Findings are sorted by total usage (descending), then
    /// by key.
    #[must_use]
    pub fn finish<F>(self, canonical: F) -> Vec<GlobalInconsistency>
    where
        F: Fn(&str, &[String]) -> Option<String>,
    {
        let mut findings: Vec<GlobalInconsistency> = self
            .usage
            .into_iter()
            .filter(|(_, forms)| forms.len() > 1)
            .map(|(key, forms)| build_finding(key, forms, &canonical))
            .collect();
        findings.sort_by(|a, b| {
            b.total_usage
                .cmp(&a.total_usage)
                .then_with(|| a.normalized_key.cmp(&b.normalized_key))
        });
        findings
    }
}

fn build_finding<F>(key: String, forms: FormTally, canonical: &F) -> GlobalInconsistency
where
    F: Fn(&str, &[String]) -> Option<String>,
{
    let variations: Vec<String> = forms.keys().cloned().collect();
    let mut usage_stats = BTreeMap::new();
    let mut file_usage = BTreeMap::new();
    for (form, (count, files)) in forms {
        usage_stats.insert(form.clone(), count);
        file_usage.insert(form, files);
    }

    // Iteration is in form order, so `>` keeps the smallest form on ties.
    let mut most_common = String::new();
    let mut best = 0;
    for (form, &count) in &usage_stats {
        if count > best {
            best = count;
            most_common.clone_from(form);
        }
    }

    let canonical_term = canonical(&key, &variations);
    let recommended = canonical_term
        .clone()
        .unwrap_or_else(|| most_common.clone());
    GlobalInconsistency {
        kind: "global_variation",
        severity: Severity::Error,
        normalized_key: key,
        variations,
        total_usage: usage_stats.values().sum(),
        usage_stats,
        file_usage,
        most_common,
        canonical_term,
        recommended,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_canonical(_: &str, _: &[String]) -> Option<String> {
        None
    }

    #[test]
    fn test_single_form_is_not_reported() {
        let mut acc = UsageAccumulator::new();
        acc.record("mitid", "MitID", Path::new("a.md"));
        acc.record("mitid", "MitID", Path::new("b.md"));
        assert_eq!(acc.unique_keys(), 1);
        assert_eq!(acc.keys_with_variations(), 0);
        assert!(acc.finish(no_canonical).is_empty());
    }

    #[test]
    fn test_counts_files_and_most_common() {
        let mut acc = UsageAccumulator::new();
        acc.record("gp", "GP", Path::new("a.md"));
        acc.record("gp", "GP", Path::new("b.md"));
        acc.record("gp", "family doctor", Path::new("b.md"));
        let findings = acc.finish(no_canonical);

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.total_usage, 3);
        assert_eq!(finding.usage_stats["GP"], 2);
        assert_eq!(finding.file_usage["GP"].len(), 2);
        assert_eq!(finding.most_common, "GP");
        assert_eq!(finding.recommended, "GP");
        assert_eq!(finding.canonical_term, None);
    }

    #[test]
    fn test_canonical_overrides_most_common() {
        let mut acc = UsageAccumulator::new();
        acc.record("cpr-nummer", "CPR number", Path::new("a.md"));
        acc.record("cpr-nummer", "CPR number", Path::new("a.md"));
        acc.record("cpr-nummer", "cpr-nummer", Path::new("b.md"));
        let findings = acc.finish(|key, _| (key == "cpr-nummer").then(|| "CPR-nummer".to_owned()));
        assert_eq!(findings[0].most_common, "CPR number");
        assert_eq!(findings[0].recommended, "CPR-nummer");
    }

    #[test]
    fn test_sorted_by_usage_then_key() {
        let mut acc = UsageAccumulator::new();
        for (key, form) in [("b", "B1"), ("b", "B2"), ("a", "A1"), ("a", "A2"), ("c", "C1"), ("c", "C2"), ("c", "C3")] {
            acc.record(key, form, Path::new("x.md"));
        }
        let keys: Vec<String> = acc
            .finish(no_canonical)
            .into_iter()
            .map(|f| f.normalized_key)
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ties_pick_smallest_form() {
        let mut acc = UsageAccumulator::new();
        acc.record("k", "zeta", Path::new("a.md"));
        acc.record("k", "alpha", Path::new("b.md"));
        assert_eq!(acc.finish(no_canonical)[0].most_common, "alpha");
    }
}
