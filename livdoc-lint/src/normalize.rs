//! Term normalization.
//!
//! Two documents may write the same concept as `CPR number`, `CPR-nummer`
//! or `civil registration number`. Normalization folds every surface form
//! to one key so occurrences can be grouped across files. The function is
//! pure: the same input always yields the same key.

use std::sync::LazyLock;

use regex::Regex;

/// Known variant phrasings and the canonical key each one folds to.
///
/// Closed, hand-maintained list. Values must not appear as keys, otherwise
/// normalizing a key twice would not be a no-op.
pub const VARIANTS: &[(&str, &str)] = &[
    ("cpr number", "cpr-nummer"),
    ("civil registration number", "cpr-nummer"),
    ("personal identification number", "cpr-nummer"),
    ("tax card", "skattekort"),
    ("health insurance card", "sundhedskort"),
    ("yellow card", "sundhedskort"),
    ("unemployment benefits", "dagpenge"),
    ("housing benefits", "boligst\u{f8}tte"),
    ("child benefits", "b\u{f8}rnepenge"),
    ("general practitioner", "gp"),
    ("family doctor", "gp"),
];

static NON_TERM_CHARS: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"[^\w\s-]") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid normalization regex: {err}"),
});

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"\s+") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid whitespace regex: {err}"),
});

/// Case-fold, strip punctuation (keeping word characters, whitespace and
/// hyphens) and collapse whitespace. Does not consult the variant table.
#[must_use]
pub fn normalize_surface(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_TERM_CHARS.replace_all(&lowered, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_owned()
}

/// Normalize `text` into the key used to group occurrences of one term.
///
/// Applies [`normalize_surface`] and then maps known variant phrasings
/// onto their canonical key.
#[must_use]
pub fn normalize(text: &str) -> String {
    let surface = normalize_surface(text);
    canonical_variant(&surface).map_or(surface, str::to_owned)
}

fn canonical_variant(surface: &str) -> Option<&'static str> {
    VARIANTS
        .iter()
        .find(|(variant, _)| *variant == surface)
        .map(|(_, canonical)| *canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_folding() {
        assert_eq!(normalize_surface("  The  CPR-Nummer! "), "the cpr-nummer");
        assert_eq!(normalize_surface("\"MitID\""), "mitid");
        assert_eq!(normalize_surface("a\tb\n c"), "a b c");
    }

    #[test]
    fn test_variants_share_a_key() {
        assert_eq!(normalize("CPR number"), "cpr-nummer");
        assert_eq!(normalize("Civil Registration Number"), "cpr-nummer");
        assert_eq!(normalize("cpr-nummer"), "cpr-nummer");
        assert_eq!(normalize("General Practitioner"), normalize("family doctor"));
        assert_eq!(normalize("Housing benefits."), "boligst\u{f8}tte");
    }

    #[test]
    fn test_unknown_phrase_passes_through() {
        assert_eq!(normalize("Residence Permit"), "residence permit");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "CPR number",
            "General Practitioner",
            "Boligst\u{f8}tte",
            "**Tax card**",
            "Sundhedskort (yellow card)",
            "",
            "   ",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample}");
            assert_eq!(normalize(&normalize_surface(sample)), once);
        }
    }

    #[test]
    fn test_canonical_values_are_not_variant_keys() {
        for (_, canonical) in VARIANTS {
            assert!(
                VARIANTS.iter().all(|(variant, _)| variant != canonical),
                "{canonical} is both a canonical value and a variant"
            );
            assert_eq!(normalize_surface(canonical), *canonical);
        }
    }
}
