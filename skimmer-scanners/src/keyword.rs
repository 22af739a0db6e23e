//! Aho-Corasick keyword scanner over named pattern sets.
//!
//! Construction takes `(pattern, value)` pairs per set and yields immutable
//! automatons. Scanning emits every overlapping match in end-position order;
//! ties among matches ending at the same position resolve by pattern
//! insertion order, which downstream longest-match selection relies on.

use std::collections::BTreeMap;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use skimmer_core::mention::Span;

use crate::error::ScanError;

/// One keyword hit: set name, original pattern, associated value, and the
/// byte span in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch<'a> {
    pub set: &'a str,
    pub pattern: &'a str,
    pub value: &'a str,
    pub span: Span,
}

/// Immutable automaton for one named pattern set.
#[derive(Debug)]
pub struct PatternSet {
    name: String,
    case_insensitive: bool,
    automaton: AhoCorasick,
    patterns: Vec<String>,
    values: Vec<String>,
    /// Folded pattern -> index, kept from the build for O(log n) membership.
    index: BTreeMap<String, usize>,
}

impl PatternSet {
    /// Builds a set from `(pattern, value)` pairs.
    ///
    /// Empty patterns are rejected. Duplicate patterns with identical values
    /// collapse to the first occurrence; duplicates with conflicting values
    /// fail the build, listing every collision.
    pub fn build(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (String, String)>,
        case_insensitive: bool,
    ) -> Result<Self, ScanError> {
        let name = name.into();
        let mut patterns: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();
        let mut index: BTreeMap<String, usize> = BTreeMap::new();
        let mut collisions: Vec<String> = Vec::new();

        for (pattern, value) in entries {
            if pattern.is_empty() {
                return Err(ScanError::EmptyPattern { set: name });
            }
            let key = if case_insensitive {
                pattern.to_lowercase()
            } else {
                pattern.clone()
            };
            match index.get(&key) {
                Some(&i) => {
                    if values[i] != value {
                        collisions.push(pattern);
                    }
                }
                None => {
                    index.insert(key, patterns.len());
                    patterns.push(pattern);
                    values.push(value);
                }
            }
        }

        if !collisions.is_empty() {
            return Err(ScanError::DuplicateConflict {
                set: name,
                collisions,
            });
        }

        let automaton = AhoCorasickBuilder::new()
            .ascii_case_insensitive(case_insensitive)
            .match_kind(MatchKind::Standard)
            .build(patterns.iter())
            .map_err(|source| ScanError::Build {
                set: name.clone(),
                source,
            })?;

        Ok(Self {
            name,
            case_insensitive,
            automaton,
            patterns,
            values,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// All overlapping matches, in end-position order.
    pub fn scan<'a>(&'a self, text: &'a str) -> impl Iterator<Item = KeywordMatch<'a>> + 'a {
        self.automaton.find_overlapping_iter(text).map(move |m| {
            let idx = m.pattern().as_usize();
            KeywordMatch {
                set: &self.name,
                pattern: &self.patterns[idx],
                value: &self.values[idx],
                span: Span::new(m.start(), m.end()),
            }
        })
    }

    /// True when `candidate` equals one of the set's patterns (after
    /// folding).
    pub fn contains(&self, candidate: &str) -> bool {
        let key = if self.case_insensitive {
            candidate.to_lowercase()
        } else {
            candidate.to_string()
        };
        self.index.contains_key(&key)
    }
}

/// Collection of named pattern sets built once at startup.
#[derive(Default)]
pub struct KeywordScanner {
    sets: BTreeMap<String, PatternSet>,
}

impl KeywordScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: PatternSet) {
        self.sets.insert(set.name().to_string(), set);
    }

    pub fn set(&self, name: &str) -> Option<&PatternSet> {
        self.sets.get(name)
    }

    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Scans one named set, collecting matches.
    pub fn scan_set<'a>(&'a self, name: &str, text: &'a str) -> Result<Vec<KeywordMatch<'a>>, ScanError> {
        let set = self
            .sets
            .get(name)
            .ok_or_else(|| ScanError::UnknownSet(name.to_string()))?;
        Ok(set.scan(text).collect())
    }
}
