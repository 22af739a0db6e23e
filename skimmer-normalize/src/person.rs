//! Person grouping: title stripping plus fuzzy fingerprint matching.

use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_config::NormalizeConfig;

use crate::fingerprint::{edit_ratio, Fingerprint};

static TITLE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:Dr|Prof|Mr|Mrs|Ms|Miss|Sir|Lady|Hon)\.?\s+").expect("static regex")
});
static NAME_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\s,]+(?:Jr|Sr|III?|IV|V|PhD|MD|Esq)\.?\s*$").expect("static regex")
});
static COMMA_ORDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z\-']+),\s*([A-Za-z\-']+)$").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Strips titles and suffixes, reorders `Last, First`, and collapses
/// whitespace.
pub fn clean_name(name: &str) -> String {
    let cleaned = name.trim();
    let cleaned = TITLE_PREFIX.replace(cleaned, "");
    let cleaned = NAME_SUFFIX.replace(&cleaned, "");
    let cleaned = COMMA_ORDER.replace(&cleaned, "$2 $1");
    WHITESPACE.replace_all(cleaned.trim(), " ").into_owned()
}

/// One in-progress person group.
pub struct PersonGroup {
    pub cleaned: String,
    pub fingerprint: Fingerprint,
}

/// Finds the group `cleaned_name` belongs to: fingerprint Jaccard first,
/// edit-distance ratio as fallback.
pub fn find_group(
    cleaned_name: &str,
    fingerprint: &Fingerprint,
    groups: &[PersonGroup],
    config: &NormalizeConfig,
) -> Option<usize> {
    for (i, group) in groups.iter().enumerate() {
        if fingerprint.similarity(&group.fingerprint) >= config.fingerprint_similarity_threshold {
            return Some(i);
        }
    }
    groups
        .iter()
        .position(|g| edit_ratio(cleaned_name, &g.cleaned) >= config.fuzzy_match_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_and_suffixes_stripped() {
        assert_eq!(clean_name("Dr. Jane Smith"), "Jane Smith");
        assert_eq!(clean_name("Jane Smith, PhD"), "Jane Smith");
        assert_eq!(clean_name("Mr Robert Jones Jr."), "Robert Jones");
    }

    #[test]
    fn comma_order_reversed() {
        assert_eq!(clean_name("Smith, Jane"), "Jane Smith");
    }

    #[test]
    fn whitespace_collapsed() {
        assert_eq!(clean_name("  Jane   Smith "), "Jane Smith");
    }

    #[test]
    fn grouping_by_fingerprint() {
        let config = NormalizeConfig::default();
        let groups = vec![PersonGroup {
            cleaned: "Jane Smith".into(),
            fingerprint: Fingerprint::of("Jane Smith", config.ngram_size),
        }];
        let fp = Fingerprint::of("Jane Smith", config.ngram_size);
        assert_eq!(find_group("Jane Smith", &fp, &groups, &config), Some(0));

        let other = Fingerprint::of("Robert Oppenheimer", config.ngram_size);
        assert_eq!(
            find_group("Robert Oppenheimer", &other, &groups, &config),
            None
        );
    }

    #[test]
    fn typo_falls_back_to_edit_distance() {
        let mut config = NormalizeConfig::default();
        config.fingerprint_similarity_threshold = 0.99;
        let groups = vec![PersonGroup {
            cleaned: "Jane Smith".into(),
            fingerprint: Fingerprint::of("Jane Smith", config.ngram_size),
        }];
        let fp = Fingerprint::of("Jane Smyth", config.ngram_size);
        assert_eq!(find_group("Jane Smyth", &fp, &groups, &config), Some(0));
    }
}
