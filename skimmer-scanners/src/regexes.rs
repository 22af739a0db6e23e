//! Typed regex scanner.
//!
//! Patterns are declared in YAML as
//! `{category: {name: {pattern, description, priority}}}` and compiled once
//! at startup. A pattern that fails to compile is skipped with a warning;
//! the rest of the set stays usable (ScannerDegraded disposition).

use std::collections::BTreeMap;

use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use skimmer_core::mention::Span;

use crate::error::ScanError;

/// Pattern priority; the router picks subsets by priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// One pattern as declared in the YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternSpec {
    pub pattern: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
}

/// YAML file schema: category -> pattern name -> spec.
pub type PatternFile = BTreeMap<String, BTreeMap<String, PatternSpec>>;

/// Which priority tiers to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternSelection {
    /// High priority only.
    Minimal,
    /// High and medium priority.
    #[default]
    Default,
    /// Every compiled pattern.
    Complete,
}

impl PatternSelection {
    fn admits(self, priority: Priority) -> bool {
        match self {
            PatternSelection::Minimal => priority == Priority::High,
            PatternSelection::Default => priority != Priority::Low,
            PatternSelection::Complete => true,
        }
    }
}

/// A match from one typed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedMatch {
    pub name: String,
    pub priority: Priority,
    pub span: Span,
    pub text: String,
}

struct CompiledPattern {
    name: String,
    priority: Priority,
    #[allow(dead_code)]
    description: String,
    regex: Regex,
}

/// One compile failure, reported but not fatal.
#[derive(Debug, Clone)]
pub struct PatternCompileError {
    pub name: String,
    pub message: String,
}

/// Immutable compiled pattern library shared by all compute workers.
pub struct RegexScanner {
    patterns: Vec<CompiledPattern>,
}

impl RegexScanner {
    /// Compiles every pattern in the file, collecting per-pattern failures
    /// instead of aborting.
    pub fn from_file(file: &PatternFile) -> (Self, Vec<PatternCompileError>) {
        let mut patterns = Vec::new();
        let mut failures = Vec::new();
        for (category, entries) in file {
            for (name, spec) in entries {
                match Regex::new(&spec.pattern) {
                    Ok(regex) if regex.find("").is_some() => {
                        warn!(%category, pattern = %name, "rejecting pattern that matches the empty string");
                        failures.push(PatternCompileError {
                            name: name.clone(),
                            message: "pattern matches zero-length strings".to_string(),
                        });
                    }
                    Ok(regex) => patterns.push(CompiledPattern {
                        name: name.clone(),
                        priority: spec.priority,
                        description: spec.description.clone(),
                        regex,
                    }),
                    Err(err) => {
                        warn!(%category, pattern = %name, error = %err, "skipping pattern that failed to compile");
                        failures.push(PatternCompileError {
                            name: name.clone(),
                            message: err.to_string(),
                        });
                    }
                }
            }
        }
        (Self { patterns }, failures)
    }

    /// Parses the YAML schema and compiles it.
    pub fn from_yaml(content: &str) -> Result<(Self, Vec<PatternCompileError>), ScanError> {
        let file: PatternFile = serde_yaml::from_str(content)?;
        Ok(Self::from_file(&file))
    }

    /// The built-in pattern library.
    pub fn with_defaults() -> Self {
        let (scanner, failures) = Self::from_yaml(DEFAULT_PATTERNS_YAML)
            .expect("built-in pattern YAML must parse");
        debug_assert!(failures.is_empty(), "built-in patterns must compile: {failures:?}");
        scanner
    }

    pub fn pattern_names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    /// Runs the selected tiers over `text`.
    ///
    /// Matches per pattern are non-overlapping and left-to-right; duplicate
    /// surface strings within one pattern are deduplicated preserving
    /// insertion order.
    pub fn scan(&self, text: &str, selection: PatternSelection) -> Vec<TypedMatch> {
        let mut out = Vec::new();
        for pattern in &self.patterns {
            if !selection.admits(pattern.priority) {
                continue;
            }
            let mut seen = std::collections::HashSet::new();
            for m in pattern.regex.find_iter(text) {
                if !seen.insert(m.as_str().to_string()) {
                    continue;
                }
                out.push(TypedMatch {
                    name: pattern.name.clone(),
                    priority: pattern.priority,
                    span: Span::new(m.start(), m.end()),
                    text: m.as_str().to_string(),
                });
            }
        }
        out
    }

    /// Runs a single pattern by name regardless of its priority tier.
    pub fn scan_named(&self, name: &str, text: &str) -> Vec<TypedMatch> {
        let mut out = Vec::new();
        for pattern in self.patterns.iter().filter(|p| p.name == name) {
            for m in pattern.regex.find_iter(text) {
                out.push(TypedMatch {
                    name: pattern.name.clone(),
                    priority: pattern.priority,
                    span: Span::new(m.start(), m.end()),
                    text: m.as_str().to_string(),
                });
            }
        }
        out
    }

    /// Counts matches per pattern name without materializing them; used by
    /// the router's one-pass analysis.
    pub fn count_matches(&self, text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for pattern in &self.patterns {
            let n = pattern.regex.find_iter(text).count();
            if n > 0 {
                counts.insert(pattern.name.clone(), n);
            }
        }
        counts
    }
}

/// Built-in pattern library, used when no pattern file is configured.
pub const DEFAULT_PATTERNS_YAML: &str = r#"
universal_entities:
  money:
    pattern: '(?i)\$[\d,]+(?:\.\d+)?(?:\s*(?:million|billion|trillion|thousand|[MBKT]))?|\b[\d,]+(?:\.\d+)?\s*(?:million|billion|trillion|thousand)?\s*(?:dollars?|USD|EUR|GBP|pounds?|euros?)\b'
    description: Money amounts with currency and magnitude words
    priority: high
  money_range:
    pattern: '(?i)\$[\d,]+(?:\.\d+)?\s*[-–—]\s*\$?[\d,]+(?:\.\d+)?(?:\s*(?:million|billion|trillion|thousand|[MBKT]))?'
    description: Money ranges with shared magnitude
    priority: high
  date:
    pattern: '(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2}(?:st|nd|rd|th)?(?:\s*[-–]\s*\d{1,2})?,?\s+\d{4}\b|\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b|\b\d{4}-\d{2}-\d{2}\b'
    description: Month-name dates (including day ranges), slashed dates, ISO dates
    priority: high
  regulation:
    pattern: '(?i)\b\d{1,2}\s*CFR\s*\d{1,4}(?:\.\d+)?(?:\([a-z]\))?|\bISO\s+\d+(?::\d{4})?\b|\bANSI\s+[A-Z]?\d+(?:\.\d+)*\b|\bNFPA\s+\d+[A-Z]?\b'
    description: CFR, ISO, ANSI, and NFPA citations
    priority: high
  email:
    pattern: '\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b'
    description: Email addresses
    priority: medium
  phone:
    pattern: '(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s]?[0-9]{4}\b'
    description: North-American phone numbers
    priority: medium
  url:
    pattern: 'https?://[^\s<>"{}|\\^`\[\]]+'
    description: URLs and web links
    priority: medium
  measurement:
    pattern: '(?i)\b[\d,]+(?:\.\d+)?\s*(?:°\s?[CF]|degrees?\s+(?:fahrenheit|celsius)|mg|kg|g|lbs?|pounds?|ounces?|oz|ml|liters?|litres?|l|gal|gallons?|ft|feet|foot|inches?|meters?|metres?|m|cm|mm|km|yards?|yd|miles?|mi|seconds?|minutes?|hours?|days?|weeks?|months?|years?)\b'
    description: Measurements with units
    priority: medium
  measurement_range:
    pattern: '(?i)\b\d+(?:\.\d+)?\s*[-–—]\s*\d+(?:\.\d+)?\s*(?:°\s?[CF]|inches?|inch|cm|mm|km|m|meters?|metres?|feet|ft|yards?|miles?|%)'
    description: Measurement ranges sharing a trailing unit
    priority: high
  time:
    pattern: '(?i)\b\d{1,2}:\d{2}(?::\d{2})?(?:\s*(?:AM|PM))?\b|\b\d{1,2}\s*(?:AM|PM)\b'
    description: Clock times
    priority: low
  percent:
    pattern: '(?i)\b\d{1,3}(?:\.\d+)?\s*percent\b|\b\d{1,3}(?:\.\d+)?%'
    description: Percentages, folded into measurements downstream
    priority: low
  version:
    pattern: '\bv?\d+\.\d+(?:\.\d+)?(?:-[a-zA-Z0-9]+)?\b'
    description: Version numbers, routing signal only
    priority: low
  range_indicator:
    pattern: '(?i)\b(?:to|through|between)\b|[-–—]'
    description: Range indicator tokens near numeric entities
    priority: low
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compile() {
        let scanner = RegexScanner::with_defaults();
        assert!(scanner.pattern_names().count() >= 10);
    }

    #[test]
    fn money_with_magnitude() {
        let scanner = RegexScanner::with_defaults();
        let hits = scanner.scan("Investment of $2.5 million closed.", PatternSelection::Minimal);
        assert!(hits.iter().any(|m| m.name == "money" && m.text == "$2.5 million"));
    }

    #[test]
    fn month_name_date_range_matches_whole() {
        let scanner = RegexScanner::with_defaults();
        let hits = scanner.scan("Meeting on August 15-20, 2024.", PatternSelection::Minimal);
        let date = hits.iter().find(|m| m.name == "date").expect("date hit");
        assert_eq!(date.text, "August 15-20, 2024");
    }

    #[test]
    fn duplicate_surfaces_deduplicated_per_pattern() {
        let scanner = RegexScanner::with_defaults();
        let hits = scanner.scan(
            "Call 555-123-4567 or 555-123-4567 today.",
            PatternSelection::Default,
        );
        let phones: Vec<_> = hits.iter().filter(|m| m.name == "phone").collect();
        assert_eq!(phones.len(), 1);
    }

    #[test]
    fn selection_filters_by_priority() {
        let scanner = RegexScanner::with_defaults();
        let text = "Meeting at 2:30 PM on 01/15/2024.";
        let minimal = scanner.scan(text, PatternSelection::Minimal);
        assert!(minimal.iter().all(|m| m.priority == Priority::High));
        let complete = scanner.scan(text, PatternSelection::Complete);
        assert!(complete.iter().any(|m| m.name == "time"));
    }

    #[test]
    fn bad_pattern_skipped_not_fatal() {
        let yaml = r#"
broken:
  unbalanced:
    pattern: '([a-z'
    priority: high
  fine:
    pattern: '\bok\b'
    priority: high
"#;
        let (scanner, failures) = RegexScanner::from_yaml(yaml).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "unbalanced");
        assert_eq!(scanner.scan("ok then", PatternSelection::Minimal).len(), 1);
    }

    #[test]
    fn zero_length_pattern_rejected() {
        let yaml = r#"
cat:
  nullable:
    pattern: 'a*'
    priority: high
"#;
        let (scanner, failures) = RegexScanner::from_yaml(yaml).unwrap();
        assert_eq!(failures.len(), 1);
        assert!(scanner.scan("aaa", PatternSelection::Complete).is_empty());
    }

    #[test]
    fn cfr_regulation_matches() {
        let scanner = RegexScanner::with_defaults();
        let hits = scanner.scan(
            "Compliance with 29 CFR 1910.132 and ISO 9001:2015 is mandatory.",
            PatternSelection::Minimal,
        );
        let regs: Vec<_> = hits.iter().filter(|m| m.name == "regulation").collect();
        assert_eq!(regs.len(), 2);
    }

    #[test]
    fn missing_priority_defaults_to_medium() {
        let yaml = r#"
cat:
  plain:
    pattern: '\bword\b'
"#;
        let (scanner, failures) = RegexScanner::from_yaml(yaml).unwrap();
        assert!(failures.is_empty());
        let hits = scanner.scan("a word here", PatternSelection::Default);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].priority, Priority::Medium);
    }
}
