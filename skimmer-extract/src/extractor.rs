//! Raw extraction: scanner orchestration, filters, and conflict resolution.
//!
//! Runs the keyword and/or structured scanners per the routing decision and
//! applies the mandatory transformations: word-boundary validation,
//! sentence-scoped longest-match dedup, measurement filters, cross-scanner
//! conflict resolution, a global overlap pass, and range flagging.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use skimmer_config::ExtractorConfig;
use skimmer_core::kind::EntityKind;
use skimmer_core::mention::{Mention, RangeFlag, RangeKind, ScannerSource, Span};
use skimmer_scanners::{KeywordScanner, RegexScanner, ScanError};

use crate::org::OrgValidator;
use crate::person::PersonValidator;
use crate::router::{RoutingDecision, Strategy};
use crate::sentences::split_sentences;

/// Obvious non-entities the corpus sweep may still hit: stopwords, document
/// artifacts, and word fragments.
static ORG_STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "this", "that", "these", "those", "into", "onto",
    "about", "above", "below", "under", "over", "standard", "addition", "current", "general",
    "figure", "table", "section", "page", "line", "item", "part", "step", "note", "see",
    "example",
];

static NUMBER_BEFORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d\s*$").expect("static regex"));
static NUMBER_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d").expect("static regex"));

/// Result of one extraction run.
#[derive(Debug)]
pub struct ExtractionOutcome {
    /// Final mention list in document order; no two mentions overlap.
    pub mentions: Vec<Mention>,
    /// True when a scanner failed and extraction continued with the rest.
    pub degraded: bool,
    pub warnings: Vec<String>,
}

/// Orchestrates the shared scanners for one document at a time.
pub struct RawExtractor {
    keyword: Arc<KeywordScanner>,
    regex: Arc<RegexScanner>,
    config: ExtractorConfig,
    org: OrgValidator,
}

impl RawExtractor {
    pub fn new(
        keyword: Arc<KeywordScanner>,
        regex: Arc<RegexScanner>,
        config: ExtractorConfig,
    ) -> Self {
        let org = OrgValidator::new(&config);
        Self {
            keyword,
            regex,
            config,
            org,
        }
    }

    /// Extracts raw mentions from a cleaned body per the routing decision.
    pub fn extract(&self, body: &str, decision: &RoutingDecision) -> ExtractionOutcome {
        let mut mentions = Vec::new();
        let mut warnings = Vec::new();
        let mut degraded = false;

        if decision.strategy != Strategy::PatternsOnly {
            self.keyword_pass(body, decision, &mut mentions, &mut warnings, &mut degraded);
        }
        self.structured_pass(body, decision, &mut mentions);

        let mentions = self.filter_parenthetical_measurements(mentions, body);
        let mentions = consolidate_ranges(mentions);
        let mentions = resolve_scanner_conflicts(mentions);
        let mentions = dedup_overlaps(mentions);
        let mentions = flag_ranges(mentions, body);
        let mentions = self.cap_per_kind(mentions);

        debug!(
            mentions = mentions.len(),
            degraded, "raw extraction complete"
        );
        ExtractionOutcome {
            mentions,
            degraded,
            warnings,
        }
    }

    fn keyword_pass(
        &self,
        body: &str,
        decision: &RoutingDecision,
        mentions: &mut Vec<Mention>,
        warnings: &mut Vec<String>,
        degraded: &mut bool,
    ) {
        let sentences = split_sentences(body, self.config.sentence_min_chars);
        let person = PersonValidator::new(
            self.keyword.set("first_names"),
            self.keyword.set("last_names"),
        );

        for set_name in &decision.keyword_sets {
            if set_name == "person" {
                for sentence in &sentences {
                    let found = person.extract(sentence.text, sentence.start);
                    mentions.extend(dedup_overlaps(found));
                }
                continue;
            }

            let kind = match set_name.as_str() {
                "org" => EntityKind::Org,
                "loc" => EntityKind::Loc,
                "gpe" => EntityKind::Gpe,
                other => {
                    warnings.push(format!("unmapped keyword set '{other}' skipped"));
                    continue;
                }
            };

            for sentence in &sentences {
                match self.keyword.scan_set(set_name, sentence.text) {
                    Ok(matches) => {
                        let mut found = Vec::new();
                        for m in matches {
                            if let Some(mention) =
                                self.keyword_mention(kind, sentence.text, sentence.start, m.span, m.value)
                            {
                                found.push(mention);
                            }
                        }
                        mentions.extend(dedup_overlaps(found));
                    }
                    Err(ScanError::UnknownSet(name)) => {
                        warnings.push(format!("keyword set '{name}' not loaded"));
                        *degraded = true;
                        break;
                    }
                    Err(err) => {
                        warn!(set = %set_name, error = %err, "keyword scan failed");
                        warnings.push(format!("keyword set '{set_name}': {err}"));
                        *degraded = true;
                        break;
                    }
                }
            }
        }
    }

    /// Validates one keyword hit within its sentence and lifts it to
    /// document coordinates.
    fn keyword_mention(
        &self,
        kind: EntityKind,
        sentence: &str,
        sentence_start: usize,
        span: Span,
        subtype: &str,
    ) -> Option<Mention> {
        if !has_word_boundaries(sentence, span) {
            return None;
        }
        let text = &sentence[span.start..span.end];

        let all_caps = text.len() >= 3 && text.chars().all(|c| c.is_ascii_uppercase());
        let min_len = if kind == EntityKind::Org && !all_caps {
            4
        } else {
            3
        };
        let is_multiword = text.split_whitespace().count() > 1;
        if text.chars().count() < min_len && !is_multiword {
            return None;
        }
        if kind == EntityKind::Org && ORG_STOPWORDS.contains(&text.to_lowercase().as_str()) {
            return None;
        }

        let confidence = if kind == EntityKind::Org {
            self.org.validate(text, sentence, span.start)?
        } else {
            0.8
        };

        let mut mention = Mention::new(
            text,
            kind,
            Span::new(sentence_start + span.start, sentence_start + span.end),
            confidence,
        )
        .with_source(ScannerSource::Keyword);
        if !subtype.is_empty() {
            mention.subtype = Some(subtype.to_string());
        }
        Some(mention)
    }

    fn structured_pass(&self, body: &str, decision: &RoutingDecision, mentions: &mut Vec<Mention>) {
        let mut saw_indicators = false;
        for m in self.regex.scan(body, decision.pattern_selection) {
            let Some((kind, subtype)) = kind_for_pattern(&m.name) else {
                continue;
            };
            saw_indicators |= kind == EntityKind::RangeIndicator;
            let mut mention = Mention::new(m.text, kind, m.span, 0.95)
                .with_source(ScannerSource::Structured);
            if let Some(subtype) = subtype {
                mention.subtype = Some(subtype.to_string());
            }
            mentions.push(mention);
        }

        // Range flagging needs the indicator hits even when the selection
        // excludes low-priority patterns.
        if !saw_indicators {
            for m in self.regex.scan_named("range_indicator", body) {
                mentions.push(
                    Mention::new(m.text, EntityKind::RangeIndicator, m.span, 0.95)
                        .with_source(ScannerSource::Structured),
                );
            }
        }
    }

    /// Drops measurements whose every occurrence in the body sits inside
    /// parentheses; the unparenthesized original form is preferred.
    fn filter_parenthetical_measurements(
        &self,
        mentions: Vec<Mention>,
        body: &str,
    ) -> Vec<Mention> {
        mentions
            .into_iter()
            .filter(|m| {
                if m.kind != EntityKind::Measurement {
                    return true;
                }
                let keep = occurrences(body, &m.text)
                    .into_iter()
                    .any(|start| !inside_parentheses(body, start, start + m.text.len()));
                if !keep {
                    debug!(text = %m.text, "measurement only found inside parentheses, dropped");
                }
                keep
            })
            .collect()
    }

    fn cap_per_kind(&self, mentions: Vec<Mention>) -> Vec<Mention> {
        let mut counts: HashMap<EntityKind, usize> = HashMap::new();
        let mut out = Vec::with_capacity(mentions.len());
        for mention in mentions {
            let count = counts.entry(mention.kind).or_insert(0);
            if *count < self.config.max_entities_per_kind {
                *count += 1;
                out.push(mention);
            }
        }
        out
    }
}

/// Maps a structured pattern name to its entity kind and fixed subtype.
fn kind_for_pattern(name: &str) -> Option<(EntityKind, Option<&'static str>)> {
    match name {
        "money" => Some((EntityKind::Money, None)),
        "money_range" => Some((EntityKind::Money, Some("range"))),
        "date" => Some((EntityKind::Date, None)),
        "time" => Some((EntityKind::Time, None)),
        "measurement" => Some((EntityKind::Measurement, None)),
        "measurement_range" => Some((EntityKind::Measurement, Some("range"))),
        "percent" => Some((EntityKind::Measurement, Some("percent"))),
        "phone" => Some((EntityKind::Phone, None)),
        "email" => Some((EntityKind::Email, None)),
        "url" => Some((EntityKind::Url, None)),
        "regulation" => Some((EntityKind::Regulation, None)),
        "range_indicator" => Some((EntityKind::RangeIndicator, None)),
        // version and custom categories feed routing counts only
        _ => None,
    }
}

/// Word-boundary validation: the characters flanking the span must not be
/// alphanumeric.
fn has_word_boundaries(text: &str, span: Span) -> bool {
    let before_ok = text[..span.start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    let after_ok = text[span.end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}

/// Byte offsets of every case-insensitive occurrence of `needle` in
/// `haystack`.
fn occurrences(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let haystack_lower = haystack.to_lowercase();
    let needle_lower = needle.to_lowercase();
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(pos) = haystack_lower[from..].find(&needle_lower) {
        out.push(from + pos);
        from += pos + needle_lower.len();
    }
    out
}

/// True when `[start, end)` lies inside a parenthesized group, judged from
/// a ±50-character window.
fn inside_parentheses(body: &str, start: usize, end: usize) -> bool {
    let mut lo = start.saturating_sub(50);
    while lo > 0 && !body.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + 50).min(body.len());
    while hi < body.len() && !body.is_char_boundary(hi) {
        hi += 1;
    }
    if end > body.len() || start > end || !body.is_char_boundary(start) || !body.is_char_boundary(end)
    {
        return false;
    }
    let before = &body[lo..start];
    let after = &body[end..hi];

    match before.rfind('(') {
        Some(open) => !before[open..].contains(')') && after.contains(')'),
        None => false,
    }
}

/// Drops mentions contained in a range-subtyped mention of the same kind
/// (`30-37 inches` wins over `37 inches`, `$30-$40 million` over `$40
/// million`).
fn consolidate_ranges(mentions: Vec<Mention>) -> Vec<Mention> {
    let range_spans: Vec<(EntityKind, Span)> = mentions
        .iter()
        .filter(|m| m.subtype.as_deref() == Some("range"))
        .map(|m| (m.kind, m.span))
        .collect();
    mentions
        .into_iter()
        .filter(|m| {
            if m.subtype.as_deref() == Some("range") {
                return true;
            }
            !range_spans
                .iter()
                .any(|(kind, span)| *kind == m.kind && span.contains(&m.span) && *span != m.span)
        })
        .collect()
}

/// Cross-scanner conflict resolution: a structured DATE/TIME/MONEY/
/// MEASUREMENT mention that textually contains a keyword mention wins
/// ("August 15, 2024" suppresses an ORG hit for "August").
fn resolve_scanner_conflicts(mentions: Vec<Mention>) -> Vec<Mention> {
    let priority_texts: Vec<String> = mentions
        .iter()
        .filter(|m| {
            matches!(
                m.kind,
                EntityKind::Date | EntityKind::Time | EntityKind::Money | EntityKind::Measurement
            )
        })
        .map(|m| m.text.to_lowercase())
        .collect();

    mentions
        .into_iter()
        .filter(|m| {
            if !m.kind.is_keyword_kind() {
                return true;
            }
            let text = m.text.to_lowercase();
            let conflicted = priority_texts.iter().any(|p| p.contains(&text));
            if conflicted {
                debug!(text = %m.text, kind = ?m.kind, "dropped by scanner conflict resolution");
            }
            !conflicted
        })
        .collect()
}

/// Longest-match-first overlap dedup; range indicators pass through
/// untouched because they are consumed by flagging, not emitted.
fn dedup_overlaps(mentions: Vec<Mention>) -> Vec<Mention> {
    let (indicators, mut candidates): (Vec<Mention>, Vec<Mention>) = mentions
        .into_iter()
        .partition(|m| m.kind == EntityKind::RangeIndicator);

    candidates.sort_by(|a, b| {
        b.span
            .len()
            .cmp(&a.span.len())
            .then(a.span.start.cmp(&b.span.start))
            .then(b.confidence.total_cmp(&a.confidence))
    });

    let mut accepted: Vec<Mention> = Vec::new();
    let mut seen_spans: Vec<Span> = Vec::new();
    for mention in candidates {
        if seen_spans.iter().any(|s| s.overlaps(&mention.span)) {
            continue;
        }
        seen_spans.push(mention.span);
        accepted.push(mention);
    }

    accepted.extend(indicators);
    accepted.sort_by_key(|m| (m.span.start, m.span.end));
    accepted
}

/// Attaches range flags to MEASUREMENT / MONEY / DATE / TIME mentions by
/// proximity with range-indicator hits, then drops the indicators.
fn flag_ranges(mentions: Vec<Mention>, body: &str) -> Vec<Mention> {
    let indicators: Vec<(Span, String)> = mentions
        .iter()
        .filter(|m| m.kind == EntityKind::RangeIndicator)
        .map(|m| (m.span, m.text.clone()))
        .collect();

    mentions
        .into_iter()
        .filter(|m| m.kind != EntityKind::RangeIndicator)
        .map(|mut m| {
            if !m.kind.is_rangeable() {
                return m;
            }
            let flag = indicators
                .iter()
                .find(|(span, _)| m.span.overlaps_or_adjacent(span, 2))
                .map(|(span, text)| {
                    RangeFlag::detected(
                        classify_indicator(text, body, *span),
                        range_context(body, *span),
                        *span,
                    )
                })
                .unwrap_or_else(RangeFlag::none);
            m.range_indicator = Some(flag);
            m
        })
        .collect()
}

/// Classifies a range indicator from its token and numeric context.
fn classify_indicator(text: &str, body: &str, span: Span) -> RangeKind {
    match text.to_lowercase().as_str() {
        "to" | "through" => RangeKind::WordRange,
        "between" => RangeKind::BetweenRange,
        "-" | "–" | "—" => {
            let window_start = span.start.saturating_sub(20);
            let mut lo = window_start;
            while lo > 0 && !body.is_char_boundary(lo) {
                lo -= 1;
            }
            let before = &body[lo..span.start];
            let mut hi = (span.end + 20).min(body.len());
            while hi < body.len() && !body.is_char_boundary(hi) {
                hi += 1;
            }
            let after = &body[span.end..hi];
            let number_before = NUMBER_BEFORE.is_match(before);
            let number_after = NUMBER_AFTER.is_match(after);
            if number_before && number_after {
                RangeKind::HyphenRange
            } else if !number_before {
                RangeKind::Negative
            } else {
                RangeKind::Ambiguous
            }
        }
        _ => RangeKind::Ambiguous,
    }
}

fn range_context(body: &str, span: Span) -> String {
    let mut lo = span.start.saturating_sub(20);
    while lo > 0 && !body.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (span.end + 20).min(body.len());
    while hi < body.len() && !body.is_char_boundary(hi) {
        hi += 1;
    }
    body[lo..hi].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ContentRouter;
    use skimmer_config::RouterConfig;
    use skimmer_scanners::PatternSet;

    fn scanner_with_orgs() -> Arc<KeywordScanner> {
        let mut scanner = KeywordScanner::new();
        scanner.insert(
            PatternSet::build(
                "org",
                [
                    ("OSHA".to_string(), "agencies".to_string()),
                    ("EPA".to_string(), "agencies".to_string()),
                    ("August".to_string(), "companies".to_string()),
                ],
                true,
            )
            .unwrap(),
        );
        scanner.insert(
            PatternSet::build(
                "gpe",
                [("Boston".to_string(), "major_cities".to_string())],
                true,
            )
            .unwrap(),
        );
        Arc::new(scanner)
    }

    fn extractor() -> RawExtractor {
        RawExtractor::new(
            scanner_with_orgs(),
            Arc::new(RegexScanner::with_defaults()),
            ExtractorConfig::default(),
        )
    }

    fn route(text: &str) -> RoutingDecision {
        ContentRouter::new(RouterConfig::default()).route(text, &RegexScanner::with_defaults())
    }

    fn extract(text: &str) -> Vec<Mention> {
        extractor().extract(text, &route(text)).mentions
    }

    #[test]
    fn basic_safety_text() {
        let mentions = extract("OSHA requires fall protection at heights over 6 feet.");
        assert!(mentions
            .iter()
            .any(|m| m.kind == EntityKind::Org && m.text == "OSHA"));
        assert!(mentions
            .iter()
            .any(|m| m.kind == EntityKind::Measurement && m.text == "6 feet"));
    }

    #[test]
    fn date_suppresses_contained_org() {
        let mentions = extract("Meeting on August 15-20, 2024.");
        let date = mentions
            .iter()
            .find(|m| m.kind == EntityKind::Date)
            .expect("date mention");
        assert_eq!(date.text, "August 15-20, 2024");
        assert!(date
            .range_indicator
            .as_ref()
            .is_some_and(|flag| flag.detected));
        assert!(!mentions.iter().any(|m| m.kind == EntityKind::Org));
    }

    #[test]
    fn parenthetical_measurement_suppressed() {
        let mentions = extract("Height is 6 feet (1.8 meters) minimum.");
        let measurements: Vec<_> = mentions
            .iter()
            .filter(|m| m.kind == EntityKind::Measurement)
            .collect();
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].text, "6 feet");
    }

    #[test]
    fn range_consolidation() {
        let mentions = extract("Ladder spacing shall be 30-37 inches.");
        let measurements: Vec<_> = mentions
            .iter()
            .filter(|m| m.kind == EntityKind::Measurement)
            .collect();
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].text, "30-37 inches");
        let flag = measurements[0].range_indicator.as_ref().unwrap();
        assert!(flag.detected);
        assert_eq!(flag.kind, Some(RangeKind::HyphenRange));
    }

    #[test]
    fn money_range_consolidation() {
        let mentions = extract("Estimated cost: $30-$40 million next year.");
        let money: Vec<_> = mentions
            .iter()
            .filter(|m| m.kind == EntityKind::Money)
            .collect();
        assert_eq!(money.len(), 1);
        assert!(money[0].text.starts_with("$30-$40"));
        assert!(money[0].range_indicator.as_ref().unwrap().detected);
    }

    #[test]
    fn no_overlaps_in_final_set() {
        let mentions = extract(
            "OSHA and EPA met in Boston on August 15-20, 2024 about the $2.5 million budget \
             for 30-37 inches of clearance (1.8 meters) at 2:30 PM.",
        );
        for (i, a) in mentions.iter().enumerate() {
            for b in mentions.iter().skip(i + 1) {
                assert!(
                    !a.span.overlaps(&b.span),
                    "overlap between {:?} and {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn no_range_indicator_mentions_emitted() {
        let mentions = extract("Spacing is 30-37 inches.");
        assert!(!mentions.iter().any(|m| m.kind == EntityKind::RangeIndicator));
    }

    #[test]
    fn word_boundary_rejects_substrings() {
        assert!(has_word_boundaries("OSHA rules", Span::new(0, 4)));
        assert!(!has_word_boundaries("XOSHA rules", Span::new(1, 5)));
        assert!(!has_word_boundaries("OSHAx", Span::new(0, 4)));
    }

    #[test]
    fn mentions_emitted_in_document_order() {
        let mentions = extract("EPA reviewed it. OSHA signed off on March 1, 2024.");
        let starts: Vec<_> = mentions.iter().map(|m| m.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn negative_indicator_classification() {
        let kind = classify_indicator("-", "a value of -40 degrees", Span::new(11, 12));
        assert_eq!(kind, RangeKind::Negative);
    }
}
