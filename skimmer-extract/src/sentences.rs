//! Terminator-based sentence splitting with document offsets.
//!
//! Splits on `.`, `!`, `?` followed by whitespace. A terminator directly
//! after a single-letter initial or a common abbreviation does not end a
//! sentence. Offsets index the original text so per-sentence scan results
//! can be shifted back to document coordinates.

/// Abbreviations whose trailing period never ends a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "hon", "sr", "jr", "st", "no", "vs", "inc", "ltd", "corp",
    "co", "etc", "e.g", "i.e",
];

/// A sentence slice plus its byte offset into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub text: &'a str,
    pub start: usize,
}

fn push_sentence<'a>(
    content: &'a str,
    start: usize,
    end: usize,
    min_chars: usize,
    out: &mut Vec<Sentence<'a>>,
) {
    let raw = &content[start..end];
    let trimmed = raw.trim_start();
    let offset = start + (raw.len() - trimmed.len());
    let trimmed = trimmed.trim_end();
    if trimmed.len() >= min_chars {
        out.push(Sentence {
            text: trimmed,
            start: offset,
        });
    }
}

/// Splits `content` into sentences, dropping fragments shorter than
/// `min_chars`.
pub fn split_sentences(content: &str, min_chars: usize) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let bytes = content.as_bytes();
    let mut current_start = 0usize;

    let mut i = 0usize;
    while i < bytes.len() {
        let ch = bytes[i] as char;
        if matches!(ch, '.' | '!' | '?') {
            let next = i + 1;
            let boundary = next >= bytes.len() || bytes[next].is_ascii_whitespace();
            if boundary && !(ch == '.' && is_abbreviation_before(content, i)) {
                push_sentence(content, current_start, next, min_chars, &mut sentences);
                let mut skip = next;
                while skip < bytes.len() && bytes[skip].is_ascii_whitespace() {
                    skip += 1;
                }
                current_start = skip;
                i = skip;
                continue;
            }
        }
        i += 1;
    }

    if current_start < content.len() {
        push_sentence(content, current_start, content.len(), min_chars, &mut sentences);
    }

    if sentences.is_empty() && !content.trim().is_empty() {
        let trimmed = content.trim_start();
        let offset = content.len() - trimmed.len();
        sentences.push(Sentence {
            text: trimmed.trim_end(),
            start: offset,
        });
    }

    sentences
}

/// True when the token directly before the period at `dot_idx` is a
/// single-letter initial or a known abbreviation.
fn is_abbreviation_before(content: &str, dot_idx: usize) -> bool {
    let before = &content[..dot_idx];
    let token_start = before
        .rfind(|c: char| !c.is_ascii_alphanumeric() && c != '.')
        .map(|p| p + 1)
        .unwrap_or(0);
    let token = before[token_start..].trim_end_matches('.');
    if token.len() == 1 && token.chars().all(|c| c.is_ascii_alphabetic()) {
        return true;
    }
    ABBREVIATIONS.contains(&token.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminators() {
        let sentences = split_sentences("First sentence. Second one! Third?", 1);
        let texts: Vec<_> = sentences.iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["First sentence.", "Second one!", "Third?"]);
    }

    #[test]
    fn offsets_index_the_source() {
        let content = "Alpha beta. Gamma delta.";
        let sentences = split_sentences(content, 1);
        for s in &sentences {
            assert_eq!(&content[s.start..s.start + s.text.len()], s.text);
        }
        assert_eq!(sentences[1].start, 12);
    }

    #[test]
    fn titles_do_not_split() {
        let sentences = split_sentences("Dr. Jane Smith arrived today. She left.", 1);
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].text.starts_with("Dr. Jane Smith"));
    }

    #[test]
    fn initials_do_not_split() {
        let sentences = split_sentences("John Q. Public spoke. Done.", 1);
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].text.contains("Q. Public"));
    }

    #[test]
    fn short_fragments_dropped() {
        let sentences = split_sentences("Ok. This sentence is long enough.", 6);
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn unterminated_tail_kept() {
        let sentences = split_sentences("Complete. trailing fragment without end", 1);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].text, "trailing fragment without end");
    }

    #[test]
    fn whole_text_fallback() {
        let sentences = split_sentences("no terminators here at all", 1);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].start, 0);
    }
}
