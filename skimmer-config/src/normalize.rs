//! Canonicalization configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct NormalizeConfig {
    /// Edit-distance ratio for the person-grouping fallback.
    #[serde(default = "default_fuzzy_match_threshold")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub fuzzy_match_threshold: f64,

    /// Sliding-window size for name fingerprints.
    #[serde(default = "default_ngram_size")]
    #[validate(range(min = 2, max = 8))]
    pub ngram_size: usize,

    /// Jaccard similarity at or above which two fingerprints group together.
    #[serde(default = "default_fingerprint_similarity_threshold")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub fingerprint_similarity_threshold: f64,
}

fn default_fuzzy_match_threshold() -> f64 {
    0.85
}

fn default_ngram_size() -> usize {
    3
}

fn default_fingerprint_similarity_threshold() -> f64 {
    0.4
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            fuzzy_match_threshold: default_fuzzy_match_threshold(),
            ngram_size: default_ngram_size(),
            fingerprint_similarity_threshold: default_fingerprint_similarity_threshold(),
        }
    }
}
