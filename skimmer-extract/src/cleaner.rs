//! Pre-scan text cleaning.
//!
//! HTML-to-markdown conversion leaves artifacts like
//! `Boston\n\n\n      Boston` that would otherwise be detected twice, once
//! per copy. Cleaning collapses whitespace runs and suppresses
//! near-duplicate adjacent lines before any scanner touches the text.

use once_cell::sync::Lazy;
use regex::Regex;

static TRIPLE_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("static regex"));
static WIDE_GAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{3,}").expect("static regex"));
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").expect("static regex"));

/// Normalizes a document body: runs of three or more newlines collapse to
/// two, runs of three or more spaces to one, and a line that is a
/// near-duplicate of one of the previous three kept lines is suppressed.
pub fn clean_text(content: &str, near_dup_threshold: f64) -> String {
    if content.is_empty() {
        return String::new();
    }

    let content = TRIPLE_NEWLINES.replace_all(content, "\n\n");
    let content = WIDE_GAPS.replace_all(&content, " ");

    let mut kept: Vec<String> = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            kept.push(String::new());
            continue;
        }
        let window = kept.iter().rev().take(3);
        let duplicate = window
            .filter(|prev| !prev.is_empty())
            .any(|prev| is_near_duplicate(prev, line, near_dup_threshold));
        if duplicate {
            // Keep structure: the duplicate line becomes a blank line.
            kept.push(String::new());
        } else {
            kept.push(line.to_string());
        }
    }

    let joined = kept.join("\n");
    let collapsed = MULTI_SPACE.replace_all(&joined, " ");
    collapsed.trim().to_string()
}

/// True when two lines are near-duplicates, tolerating small typos
/// ("San Francisco" vs "San Fransisco").
pub fn is_near_duplicate(a: &str, b: &str, threshold: f64) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return true;
    }

    let (la, lb) = (a.chars().count(), b.chars().count());
    let max_len = la.max(lb);
    if max_len > 0 && (la.abs_diff(lb) as f64) / (max_len as f64) > 0.3 {
        return false;
    }

    char_similarity(&a, &b) > threshold
}

/// Tolerant in-order character match ratio: a two-pointer walk that skips
/// at most one character on either side per mismatch.
fn char_similarity(a: &str, b: &str) -> f64 {
    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let mut matches = 0usize;
    let (mut i, mut j) = (0usize, 0usize);
    while i < s1.len() && j < s2.len() {
        if s1[i] == s2[j] {
            matches += 1;
            i += 1;
            j += 1;
        } else if i + 1 < s1.len() && s1[i + 1] == s2[j] {
            i += 1;
        } else if j + 1 < s2.len() && s1[i] == s2[j + 1] {
            j += 1;
        } else {
            i += 1;
            j += 1;
        }
    }

    matches as f64 / s1.len().max(s2.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_newline_runs() {
        let cleaned = clean_text("Boston\n\n\n\nHarbor", 0.85);
        assert_eq!(cleaned, "Boston\n\nHarbor");
    }

    #[test]
    fn collapses_space_runs() {
        let cleaned = clean_text("one     two", 0.85);
        assert_eq!(cleaned, "one two");
    }

    #[test]
    fn suppresses_duplicate_adjacent_lines() {
        let cleaned = clean_text("Boston\n\n\nBoston\nHarbor", 0.85);
        assert_eq!(cleaned.matches("Boston").count(), 1);
        assert!(cleaned.contains("Harbor"));
    }

    #[test]
    fn suppresses_typo_duplicates() {
        let cleaned = clean_text("San Francisco\nSan Fransisco\n", 0.85);
        assert_eq!(cleaned.matches("San Fran").count(), 1);
    }

    #[test]
    fn distinct_lines_survive() {
        let cleaned = clean_text("Boston office\nChicago office\n", 0.85);
        assert!(cleaned.contains("Boston office"));
        assert!(cleaned.contains("Chicago office"));
    }

    #[test]
    fn near_duplicate_length_gate() {
        assert!(!is_near_duplicate("Boston", "Boston metropolitan area", 0.85));
        assert!(is_near_duplicate("boston", "Boston", 0.85));
    }

    #[test]
    fn empty_input() {
        assert_eq!(clean_text("", 0.85), "");
        assert_eq!(clean_text("   \n \n  ", 0.85), "");
    }
}
