//! Content-routing thresholds.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Thresholds driving the keyword / structured / hybrid dispatch decision.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RouterConfig {
    /// Keyword-indicator density at or above which the keyword scanner runs
    /// alone.
    #[serde(default = "default_keyword_threshold")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub keyword_threshold: f64,

    /// Structured-indicator density at or above which the regex scanner runs
    /// alone.
    #[serde(default = "default_structured_threshold")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub structured_threshold: f64,

    /// Keyword-density floor for the hybrid path.
    #[serde(default = "default_hybrid_keyword_floor")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub hybrid_keyword_floor: f64,

    /// Structured-density floor for the hybrid path.
    #[serde(default = "default_hybrid_structured_floor")]
    #[validate(custom(function = validation::validate_unit_interval))]
    pub hybrid_structured_floor: f64,

    /// Word count under which a document with few structured hits takes the
    /// minimal keyword path.
    #[serde(default = "default_small_doc_words")]
    #[validate(range(min = 1))]
    pub small_doc_words: usize,
}

fn default_keyword_threshold() -> f64 {
    0.8
}

fn default_structured_threshold() -> f64 {
    0.3
}

fn default_hybrid_keyword_floor() -> f64 {
    0.4
}

fn default_hybrid_structured_floor() -> f64 {
    0.2
}

fn default_small_doc_words() -> usize {
    500
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            keyword_threshold: default_keyword_threshold(),
            structured_threshold: default_structured_threshold(),
            hybrid_keyword_floor: default_hybrid_keyword_floor(),
            hybrid_structured_floor: default_hybrid_structured_floor(),
            small_doc_words: default_small_doc_words(),
        }
    }
}
