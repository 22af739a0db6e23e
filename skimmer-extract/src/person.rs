//! Person extraction with conservative validation.
//!
//! Candidates come from shape patterns (titled names, First Last,
//! Last-comma-First). A candidate is accepted only when (a) a title
//! directly precedes it, (b) a role word appears within ±50 characters, or
//! (c) both tokens are present in the first-name and last-name corpora.

use once_cell::sync::Lazy;
use regex::Regex;

use skimmer_core::kind::EntityKind;
use skimmer_core::mention::{Mention, ScannerSource, Span};
use skimmer_scanners::PatternSet;

static TITLED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof|Sir|Hon)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2}\b")
        .expect("static regex")
});
static PLAIN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:\s+(?:[A-Z]\.\s+)?[A-Z][a-z]+){1,2}\b").expect("static regex")
});
static COMMA_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+,\s+[A-Z][a-z]+\b").expect("static regex"));

static ROLE_WORDS: &[&str] = &[
    "ceo", "cto", "cfo", "president", "founder", "chairman", "director", "manager", "supervisor",
    "inspector", "worker", "contractor", "engineer", "officer", "coordinator",
];

/// Person validator backed by the first-name and last-name corpora.
pub struct PersonValidator<'a> {
    first_names: Option<&'a PatternSet>,
    last_names: Option<&'a PatternSet>,
}

impl<'a> PersonValidator<'a> {
    pub fn new(first_names: Option<&'a PatternSet>, last_names: Option<&'a PatternSet>) -> Self {
        Self {
            first_names,
            last_names,
        }
    }

    /// Extracts validated person mentions from one sentence, shifting spans
    /// by `offset` into document coordinates.
    pub fn extract(&self, sentence: &str, offset: usize) -> Vec<Mention> {
        let mut mentions = Vec::new();

        for m in TITLED_NAME.find_iter(sentence) {
            mentions.push(self.mention(sentence, m.start(), m.end(), offset, 0.95));
        }

        for m in PLAIN_NAME.find_iter(sentence) {
            let mut text = m.as_str();
            let mut start = m.start();
            let mut stripped_role = false;

            // Leading role words ("Director Paulo Ribeiro") are context, not
            // part of the name.
            while text.split_whitespace().count() > 2 {
                let head = text.split_whitespace().next().unwrap_or_default();
                if !is_role_word(head) {
                    break;
                }
                let rest = text[head.len()..].trim_start();
                start += text.len() - rest.len();
                text = rest;
                stripped_role = true;
            }

            let (first, last) = split_name(text);
            let confidence = if self.in_corpora(first, last) {
                0.85
            } else if stripped_role || self.role_nearby(sentence, start, start + text.len()) {
                0.75
            } else {
                continue;
            };
            mentions.push(self.mention(sentence, start, start + text.len(), offset, confidence));
        }

        for m in COMMA_NAME.find_iter(sentence) {
            let mut parts = m.as_str().splitn(2, ',');
            let last = parts.next().unwrap_or_default().trim();
            let first = parts.next().unwrap_or_default().trim();
            let confidence = if self.in_corpora(first, last) {
                0.85
            } else if self.role_nearby(sentence, m.start(), m.end()) {
                0.7
            } else {
                continue;
            };
            mentions.push(self.mention(sentence, m.start(), m.end(), offset, confidence));
        }

        mentions
    }

    fn mention(
        &self,
        sentence: &str,
        start: usize,
        end: usize,
        offset: usize,
        confidence: f64,
    ) -> Mention {
        Mention::new(
            &sentence[start..end],
            EntityKind::Person,
            Span::new(offset + start, offset + end),
            confidence,
        )
        .with_source(ScannerSource::Keyword)
    }

    fn in_corpora(&self, first: &str, last: &str) -> bool {
        match (self.first_names, self.last_names) {
            (Some(firsts), Some(lasts)) => firsts.contains(first) && lasts.contains(last),
            _ => false,
        }
    }

    fn role_nearby(&self, sentence: &str, start: usize, end: usize) -> bool {
        let lo = start.saturating_sub(50);
        let hi = (end + 50).min(sentence.len());
        let mut lo = lo;
        while lo > 0 && !sentence.is_char_boundary(lo) {
            lo -= 1;
        }
        let mut hi = hi;
        while hi < sentence.len() && !sentence.is_char_boundary(hi) {
            hi += 1;
        }
        let context = sentence[lo..hi].to_lowercase();
        ROLE_WORDS.iter().any(|role| context.contains(role))
    }
}

fn split_name(name: &str) -> (&str, &str) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default();
    let last = parts.last().unwrap_or(first);
    (first, last)
}

fn is_role_word(token: &str) -> bool {
    ROLE_WORDS.contains(&token.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(name: &str, terms: &[&str]) -> PatternSet {
        PatternSet::build(
            name,
            terms.iter().map(|t| (t.to_string(), String::new())),
            true,
        )
        .unwrap()
    }

    #[test]
    fn titled_names_always_accepted() {
        let validator = PersonValidator::new(None, None);
        let mentions = validator.extract("Dr. Jane Smith attended.", 0);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "Dr. Jane Smith");
    }

    #[test]
    fn corpus_backed_plain_names_accepted() {
        let firsts = corpus("first_names", &["Jane", "John"]);
        let lasts = corpus("last_names", &["Smith", "Doe"]);
        let validator = PersonValidator::new(Some(&firsts), Some(&lasts));
        let mentions = validator.extract("Jane Smith filed the report.", 0);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "Jane Smith");
    }

    #[test]
    fn unknown_pairs_without_context_rejected() {
        let firsts = corpus("first_names", &["Jane"]);
        let lasts = corpus("last_names", &["Smith"]);
        let validator = PersonValidator::new(Some(&firsts), Some(&lasts));
        let mentions = validator.extract("Ladder Safety matters here.", 0);
        assert!(mentions.is_empty());
    }

    #[test]
    fn role_word_rescues_unknown_name() {
        let validator = PersonValidator::new(None, None);
        let mentions = validator.extract("Director Paulo Ribeiro approved the plan.", 0);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "Paulo Ribeiro");
    }

    #[test]
    fn comma_form_accepted_with_corpora() {
        let firsts = corpus("first_names", &["Jane"]);
        let lasts = corpus("last_names", &["Smith"]);
        let validator = PersonValidator::new(Some(&firsts), Some(&lasts));
        let mentions = validator.extract("Smith, Jane reviewed it.", 0);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].text, "Smith, Jane");
    }

    #[test]
    fn spans_shift_by_offset() {
        let validator = PersonValidator::new(None, None);
        let mentions = validator.extract("Dr. Jane Smith attended.", 100);
        assert_eq!(mentions[0].span, Span::new(100, 114));
    }
}
