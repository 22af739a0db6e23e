//! Raw-extraction configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Knobs for text cleaning and scanner-output filtering.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ExtractorConfig {
    /// Character-similarity ratio above which adjacent lines count as
    /// near-duplicates and are suppressed.
    #[serde(default = "default_near_duplicate_similarity")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub near_duplicate_similarity: f64,

    /// Sentences shorter than this are skipped by the keyword pass.
    #[serde(default = "default_sentence_min_chars")]
    pub sentence_min_chars: usize,

    /// Evidence score required to accept a normal single-word ORG candidate.
    #[serde(default = "default_org_acceptance_threshold")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub org_acceptance_threshold: f64,

    /// Evidence score required for ORG candidates of four characters or
    /// fewer.
    #[serde(default = "default_org_short_word_threshold")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub org_short_word_threshold: f64,

    /// Evidence score required for high-confusability common words.
    #[serde(default = "default_org_confusable_threshold")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub org_confusable_threshold: f64,

    /// Common words that require the confusable threshold before being
    /// accepted as organizations.
    #[serde(default = "default_confusable_words")]
    pub confusable_words: Vec<String>,

    /// Hard cap on raw mentions kept per kind per document.
    #[serde(default = "default_max_entities_per_kind")]
    #[validate(range(min = 1))]
    pub max_entities_per_kind: usize,
}

fn default_near_duplicate_similarity() -> f64 {
    0.85
}

fn default_sentence_min_chars() -> usize {
    6
}

fn default_org_acceptance_threshold() -> f64 {
    0.5
}

fn default_org_short_word_threshold() -> f64 {
    0.6
}

fn default_org_confusable_threshold() -> f64 {
    0.8
}

fn default_confusable_words() -> Vec<String> {
    [
        "here", "there", "place", "front", "back", "side", "top", "bottom", "left", "right",
        "made", "built", "used", "work", "home", "house", "time", "year", "month", "week", "day",
        "part", "area", "zone",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_entities_per_kind() -> usize {
    200
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            near_duplicate_similarity: default_near_duplicate_similarity(),
            sentence_min_chars: default_sentence_min_chars(),
            org_acceptance_threshold: default_org_acceptance_threshold(),
            org_short_word_threshold: default_org_short_word_threshold(),
            org_confusable_threshold: default_org_confusable_threshold(),
            confusable_words: default_confusable_words(),
            max_entities_per_kind: default_max_entities_per_kind(),
        }
    }
}
