//! Evidence-scored validation of organization candidates.
//!
//! Corpus hits for single common words ("Target", "Apple", "here") are the
//! dominant false-positive source. Each candidate starts from a base score
//! set by its shape and accumulates evidence from the surrounding context;
//! acceptance thresholds rise for short words and for a configured list of
//! high-confusability common words.

use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_config::ExtractorConfig;

struct EvidencePattern {
    regex: &'static Lazy<Regex>,
    score: f64,
}

static LEGAL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9\-]*(?:Inc|LLC|Ltd|Corp|Co|SA|SpA|GmbH|PLC|AG|SAS|NV|BV)\b")
        .expect("static regex")
});
static CORPORATE_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[A-Za-z0-9\-]+\s+(?:Inc|LLC|Ltd|Corp|Co|Company|Group|Holdings|Ventures|Partners|Enterprise|Industries|Solutions|Technologies|Services|Consulting)\b",
    )
    .expect("static regex")
});
static EMBEDDED_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z]+\d+[A-Za-z0-9]*\b|\b\d+[A-Za-z][A-Za-z0-9\-]*\b").expect("static regex"));
static EXECUTIVE_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:CEO|CTO|CFO|President|Founder|Chairman|Director)\s+(?:of|at)\s+[A-Za-z0-9\-]+\b")
        .expect("static regex")
});
static CAPS_ACRONYM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{3,}\b").expect("static regex"));
static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+[A-Z][A-Za-z0-9]*\b").expect("static regex"));
static HYPHENATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9]+-[A-Za-z0-9\-]+\b").expect("static regex"));

static EVIDENCE: &[EvidencePattern] = &[
    EvidencePattern { regex: &LEGAL_SUFFIX, score: 0.5 },
    EvidencePattern { regex: &CORPORATE_CONTEXT, score: 0.5 },
    EvidencePattern { regex: &EMBEDDED_DIGITS, score: 0.4 },
    EvidencePattern { regex: &CAPS_ACRONYM, score: 0.35 },
    EvidencePattern { regex: &EXECUTIVE_CONTEXT, score: 0.3 },
    EvidencePattern { regex: &CAMEL_CASE, score: 0.2 },
    EvidencePattern { regex: &HYPHENATED, score: 0.2 },
];

/// Validates ORG candidates against their sentence context.
pub struct OrgValidator {
    acceptance_threshold: f64,
    short_word_threshold: f64,
    confusable_threshold: f64,
    confusables: Vec<String>,
}

impl OrgValidator {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            acceptance_threshold: config.org_acceptance_threshold,
            short_word_threshold: config.org_short_word_threshold,
            confusable_threshold: config.org_confusable_threshold,
            confusables: config
                .confusable_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }

    /// Scores `candidate` at `start` within `sentence`; returns the
    /// confidence when the evidence clears the applicable threshold.
    pub fn validate(&self, candidate: &str, sentence: &str, start: usize) -> Option<f64> {
        let word_count = candidate.split_whitespace().count();
        let word_length = candidate.trim().chars().count();
        let acronym_shaped =
            word_length >= 3 && candidate.chars().all(|c| c.is_ascii_uppercase());

        let mut score: f64 = if word_count > 1 {
            0.9
        } else if candidate.chars().next().is_some_and(char::is_uppercase) {
            0.3
        } else {
            0.1
        };

        // Short single words start from half the base; acronyms like OSHA
        // keep the full base.
        if word_count == 1 && word_length <= 4 && !acronym_shaped {
            score *= 0.5;
        }

        let context = context_window(sentence, start, candidate.len(), 100);
        score += self.evidence_score(candidate, context);

        let candidate_lower = candidate.to_lowercase();
        let threshold = if self.confusables.contains(&candidate_lower) {
            self.confusable_threshold
        } else if word_count == 1 && word_length <= 4 && !acronym_shaped {
            self.short_word_threshold
        } else {
            self.acceptance_threshold
        };

        // Epsilon keeps boundary sums like 0.3 + 0.2 from losing to rounding.
        (score + 1e-9 >= threshold).then(|| score.min(1.0))
    }

    fn evidence_score(&self, candidate: &str, context: &str) -> f64 {
        let candidate_lower = candidate.to_lowercase();
        let context_lower = context.to_lowercase();
        let candidate_pos = context_lower.find(&candidate_lower);
        let mut total = 0.0;

        for pattern in EVIDENCE {
            for m in pattern.regex.find_iter(context) {
                let match_lower = m.as_str().to_lowercase();
                if match_lower.contains(&candidate_lower) || candidate_lower.contains(&match_lower)
                {
                    total += pattern.score;
                    break;
                }
                if let Some(cpos) = candidate_pos {
                    if cpos.abs_diff(m.start()) <= 20 {
                        // Nearby but not containing: half credit.
                        total += pattern.score * 0.5;
                        break;
                    }
                }
            }
        }
        total
    }
}

/// Byte-safe context slice of ±`margin` around `[start, start+len)`.
fn context_window(text: &str, start: usize, len: usize, margin: usize) -> &str {
    let mut lo = start.saturating_sub(margin);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (start + len + margin).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}
