//! Content-aware scanner dispatch.
//!
//! One linear pass computes character/word statistics, keyword-indicator
//! density, structured-indicator score, per-category pattern counts, and an
//! inferred genre; a threshold table then picks the dispatch strategy.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use skimmer_config::RouterConfig;
use skimmer_scanners::{PatternSelection, RegexScanner};

/// Dispatch strategy for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    KeywordsOnly,
    PatternsOnly,
    Hybrid,
}

/// Inferred document genre, used to pick keyword subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Safety,
    Technical,
    Environmental,
    Complex,
    Simple,
}

impl Genre {
    pub fn label(self) -> &'static str {
        match self {
            Genre::Safety => "safety",
            Genre::Technical => "technical",
            Genre::Environmental => "environmental",
            Genre::Complex => "complex",
            Genre::Simple => "simple",
        }
    }
}

/// Statistics computed by the analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct ContentAnalysis {
    pub char_count: usize,
    pub word_count: usize,
    pub avg_word_length: f64,
    pub keyword_density: f64,
    pub structured_density: f64,
    pub structured_hits: usize,
    pub pattern_counts: BTreeMap<String, usize>,
    pub genre: Genre,
    pub genre_scores: BTreeMap<String, f64>,
}

/// Routing verdict: which scanners run, with which subsets.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub strategy: Strategy,
    pub keyword_sets: Vec<String>,
    #[serde(skip)]
    pub pattern_selection: PatternSelection,
    pub confidence: f64,
    pub reasoning: String,
    pub analysis: ContentAnalysis,
}

/// Words suggesting plain keyword matching will be enough.
const KEYWORD_HINTS: &[&str] = &[
    "safety", "osha", "epa", "hazard", "risk", "ppe", "regulation", "compliance", "standard",
    "emergency", "niosh", "fda", "cdc", "dot", "faa", "ansi", "iso", "training", "procedure",
    "policy", "equipment", "worker", "employee", "supervisor", "manager",
];

/// Sigils and tokens suggesting typed patterns are present.
const STRUCTURED_HINTS: &[&str] = &[
    "$", "dollar", "cost", "price", "budget", "fee", "january", "february", "march", "april",
    "may", "june", "july", "august", "september", "october", "november", "december", "am", "pm",
    "time", "schedule", "deadline", "@", ".com", ".org", ".gov", "email", "phone", "contact",
    "version", "specification", "measurement", "temperature", "pressure", "weight", "dimension",
    "cfr",
];

const SAFETY_HINTS: &[&str] = &["osha", "safety", "hazard", "ppe", "emergency", "accident"];
const TECHNICAL_HINTS: &[&str] = &["specification", "standard", "procedure", "cfr", "regulation"];
const ENVIRONMENTAL_HINTS: &[&str] = &["epa", "environmental", "pollution", "emission", "waste"];

/// Content router; never mutates its input.
pub struct ContentRouter {
    config: RouterConfig,
}

impl ContentRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Analyzes `text` and returns the dispatch decision.
    pub fn route(&self, text: &str, patterns: &RegexScanner) -> RoutingDecision {
        let analysis = self.analyze(text, patterns);
        let decision = self.decide(analysis);
        debug!(
            strategy = ?decision.strategy,
            confidence = decision.confidence,
            genre = decision.analysis.genre.label(),
            "routing decision"
        );
        decision
    }

    fn analyze(&self, text: &str, patterns: &RegexScanner) -> ContentAnalysis {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        let word_count = words.len();
        let avg_word_length = if word_count == 0 {
            0.0
        } else {
            words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / word_count as f64
        };

        let keyword_matches = words
            .iter()
            .filter(|w| KEYWORD_HINTS.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())))
            .count();
        let keyword_density = if word_count == 0 {
            0.0
        } else {
            keyword_matches as f64 / word_count as f64
        };

        let structured_matches = STRUCTURED_HINTS
            .iter()
            .filter(|hint| lower.contains(*hint))
            .count();
        let structured_density = structured_matches as f64 / STRUCTURED_HINTS.len() as f64;

        let pattern_counts = patterns.count_matches(text);
        let structured_hits = pattern_counts.values().sum();

        let (genre, genre_scores) = infer_genre(&lower, structured_hits);

        ContentAnalysis {
            char_count: text.chars().count(),
            word_count,
            avg_word_length,
            keyword_density,
            structured_density,
            structured_hits,
            pattern_counts,
            genre,
            genre_scores,
        }
    }

    fn decide(&self, analysis: ContentAnalysis) -> RoutingDecision {
        let cfg = &self.config;
        let mut confidence: f64 = 0.5;

        let (strategy, keyword_sets, pattern_selection) =
            if analysis.keyword_density >= cfg.keyword_threshold {
                confidence += 0.3;
                // Keyword-routed documents keep the default structured tier
                // as a net for typed entities embedded in keyword-heavy text.
                (
                    Strategy::KeywordsOnly,
                    keyword_sets_for(analysis.genre),
                    PatternSelection::Default,
                )
            } else if analysis.structured_density >= cfg.structured_threshold {
                confidence += 0.3;
                (
                    Strategy::PatternsOnly,
                    Vec::new(),
                    selection_for(analysis.structured_hits),
                )
            } else if analysis.keyword_density >= cfg.hybrid_keyword_floor
                && analysis.structured_density >= cfg.hybrid_structured_floor
            {
                confidence += 0.2;
                (
                    Strategy::Hybrid,
                    keyword_sets_for(analysis.genre),
                    selection_for(analysis.structured_hits),
                )
            } else if analysis.word_count < cfg.small_doc_words && analysis.structured_hits < 3 {
                confidence += 0.4;
                (
                    Strategy::KeywordsOnly,
                    minimal_keyword_sets(),
                    PatternSelection::Default,
                )
            } else {
                confidence += 0.1;
                (
                    Strategy::PatternsOnly,
                    Vec::new(),
                    PatternSelection::Default,
                )
            };

        if analysis.genre != Genre::Simple {
            confidence += 0.1;
        }
        let confidence = confidence.min(1.0);

        let reasoning = reasoning_for(&analysis, strategy, confidence);

        RoutingDecision {
            strategy,
            keyword_sets,
            pattern_selection,
            confidence,
            reasoning,
            analysis,
        }
    }
}

fn infer_genre(lower: &str, structured_hits: usize) -> (Genre, BTreeMap<String, f64>) {
    let count = |hints: &[&str]| hints.iter().filter(|h| lower.contains(*h)).count();
    let safety = count(SAFETY_HINTS);
    let technical = count(TECHNICAL_HINTS);
    let environmental = count(ENVIRONMENTAL_HINTS);

    let genre = if safety >= 2 {
        Genre::Safety
    } else if technical >= 2 {
        Genre::Technical
    } else if environmental >= 2 {
        Genre::Environmental
    } else if structured_hits >= 5 {
        Genre::Complex
    } else {
        Genre::Simple
    };

    let mut scores = BTreeMap::new();
    scores.insert("safety".to_string(), safety as f64 / SAFETY_HINTS.len() as f64);
    scores.insert(
        "technical".to_string(),
        technical as f64 / TECHNICAL_HINTS.len() as f64,
    );
    scores.insert(
        "environmental".to_string(),
        environmental as f64 / ENVIRONMENTAL_HINTS.len() as f64,
    );
    (genre, scores)
}

fn keyword_sets_for(genre: Genre) -> Vec<String> {
    let sets: &[&str] = match genre {
        Genre::Safety => &["org", "loc", "gpe"],
        Genre::Environmental => &["org", "gpe", "loc"],
        Genre::Technical => &["org", "gpe"],
        Genre::Complex | Genre::Simple => &["person", "org", "loc", "gpe"],
    };
    sets.iter().map(|s| s.to_string()).collect()
}

fn minimal_keyword_sets() -> Vec<String> {
    vec!["person".to_string(), "org".to_string(), "gpe".to_string()]
}

fn selection_for(structured_hits: usize) -> PatternSelection {
    if structured_hits < 3 {
        PatternSelection::Minimal
    } else if structured_hits > 10 {
        PatternSelection::Complete
    } else {
        PatternSelection::Default
    }
}

fn reasoning_for(analysis: &ContentAnalysis, strategy: Strategy, confidence: f64) -> String {
    let lead = match strategy {
        Strategy::KeywordsOnly => format!(
            "High keyword density ({:.2}); simple string matching optimal",
            analysis.keyword_density
        ),
        Strategy::PatternsOnly => format!(
            "Structured patterns detected ({:.2}); regex processing required",
            analysis.structured_density
        ),
        Strategy::Hybrid => "Mixed content; both keywords and structured patterns present".to_string(),
    };
    format!(
        "{lead}; document genre: {}; confidence: {confidence:.2}",
        analysis.genre.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> ContentRouter {
        ContentRouter::new(RouterConfig::default())
    }

    fn patterns() -> RegexScanner {
        RegexScanner::with_defaults()
    }

    #[test]
    fn keyword_heavy_text_routes_to_keywords() {
        let text = "safety osha hazard ppe compliance training equipment worker";
        let decision = router().route(text, &patterns());
        assert_eq!(decision.strategy, Strategy::KeywordsOnly);
        assert!(decision.confidence > 0.5);
    }

    #[test]
    fn structured_heavy_text_routes_to_patterns() {
        let text = "Contact john.doe@company.com about the $2,500 budget due March 15, 2024 \
                    at 2:30 PM, see https://example.org or call 555-123-4567, version 2.1 \
                    spec, 40 CFR 261.1, email phone contact schedule deadline cost price fee \
                    temperature measurement specification dimension weight pressure";
        let decision = router().route(text, &patterns());
        assert_eq!(decision.strategy, Strategy::PatternsOnly);
    }

    #[test]
    fn small_plain_document_takes_minimal_keywords() {
        let text = "A short note about nothing in particular with plain words only";
        let decision = router().route(text, &patterns());
        assert_eq!(decision.strategy, Strategy::KeywordsOnly);
        assert_eq!(decision.keyword_sets, vec!["person", "org", "gpe"]);
    }

    #[test]
    fn adding_keyword_hints_is_monotone() {
        let base = "safety osha hazard ppe compliance training equipment worker";
        let decision = router().route(base, &patterns());
        assert_eq!(decision.strategy, Strategy::KeywordsOnly);

        let more = format!("{base} safety osha hazard compliance");
        let decision = router().route(&more, &patterns());
        assert_eq!(decision.strategy, Strategy::KeywordsOnly);
    }

    #[test]
    fn genre_inference() {
        let text = "OSHA safety hazard assessments and emergency planning for 29 CFR compliance";
        let decision = router().route(text, &patterns());
        assert_eq!(decision.analysis.genre, Genre::Safety);
        assert!(decision.reasoning.contains("safety"));
    }

    #[test]
    fn router_never_mutates_input() {
        let text = "immutable input";
        let before = text.to_string();
        let _ = router().route(text, &patterns());
        assert_eq!(text, before);
    }
}
