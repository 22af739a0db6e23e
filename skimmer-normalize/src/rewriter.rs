//! Global rewrite: every known surface form becomes a `‖canonical‖id‖`
//! marker.
//!
//! A second Aho-Corasick automaton is built from the final
//! `{surface -> (canonical, id)}` map. Matches are filtered to the longest
//! span per start position, then applied from the end of the body backwards
//! so earlier offsets stay valid. Replacements require word-boundary
//! neighbours, and text already inside a marker is never rewritten, which
//! makes the pass idempotent.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use skimmer_core::entity::CanonicalEntity;
use skimmer_core::mention::Span;

/// Marker delimiter, chosen to be absent from real text.
pub const MARKER_DELIMITER: char = '‖';

static MARKER_REGION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"‖[^‖\n]*‖[^‖\n]*‖").expect("static regex"));

/// Rewrites `body`, replacing every surface form of `entities` with its
/// marker. Returns the body unchanged when there is nothing to replace.
pub fn rewrite(body: &str, entities: &[CanonicalEntity]) -> String {
    let mut surfaces: Vec<&str> = Vec::new();
    let mut replacements: Vec<(String, &str)> = Vec::new();
    for entity in entities {
        for surface in entity.aliases.iter().map(String::as_str).chain([entity.normalized.as_str()])
        {
            if surface.is_empty() {
                continue;
            }
            surfaces.push(surface);
            replacements.push((entity.normalized.clone(), &entity.id));
        }
    }
    if surfaces.is_empty() || body.is_empty() {
        return body.to_string();
    }

    let automaton = match AhoCorasickBuilder::new()
        .match_kind(MatchKind::Standard)
        .build(&surfaces)
    {
        Ok(automaton) => automaton,
        Err(err) => {
            debug!(error = %err, "rewrite automaton build failed, body left unchanged");
            return body.to_string();
        }
    };

    let marker_regions: Vec<Span> = MARKER_REGION
        .find_iter(body)
        .map(|m| Span::new(m.start(), m.end()))
        .collect();

    // All overlapping matches, filtered to the longest span per start
    // position.
    let mut matches: Vec<(usize, usize, usize)> = automaton
        .find_overlapping_iter(body)
        .map(|m| (m.start(), m.end(), m.pattern().as_usize()))
        .collect();
    matches.sort_by_key(|&(start, end, _)| (start, std::cmp::Reverse(end)));
    matches.dedup_by_key(|&mut (start, ..)| start);

    // Longest-match-wins across overlapping candidates, with boundary and
    // marker-region checks applied before acceptance.
    matches.sort_by_key(|&(start, end, _)| (std::cmp::Reverse(end - start), start));
    let mut accepted: Vec<(usize, usize, usize)> = Vec::new();
    for &(start, end, pattern) in &matches {
        let span = Span::new(start, end);
        if accepted
            .iter()
            .any(|&(s, e, _)| span.overlaps(&Span::new(s, e)))
        {
            continue;
        }
        if !has_word_boundaries(body, start, end) {
            continue;
        }
        if marker_regions.iter().any(|r| r.overlaps(&span)) {
            continue;
        }
        accepted.push((start, end, pattern));
    }

    // Apply from the end backwards so earlier offsets stay valid.
    accepted.sort_by_key(|&(start, ..)| std::cmp::Reverse(start));
    let mut result = body.to_string();
    for &(start, end, pattern) in &accepted {
        let (canonical, id) = &replacements[pattern];
        result.replace_range(
            start..end,
            &format!("{MARKER_DELIMITER}{canonical}{MARKER_DELIMITER}{id}{MARKER_DELIMITER}"),
        );
    }
    result
}

fn has_word_boundaries(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    let after_ok = text[end..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}
