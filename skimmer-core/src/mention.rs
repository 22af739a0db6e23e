//! Raw mentions: positioned entity occurrences produced by the scanners.

use serde::{Deserialize, Serialize};

use crate::kind::EntityKind;

/// Half-open byte range `[start, end)` into the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted span {start}..{end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two ranges intersect.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// True when `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the spans overlap or sit within `margin` bytes of each other.
    pub fn overlaps_or_adjacent(&self, other: &Span, margin: usize) -> bool {
        if self.overlaps(other) {
            return true;
        }
        self.end.abs_diff(other.start) <= margin || other.end.abs_diff(self.start) <= margin
    }
}

/// Which scanner produced a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScannerSource {
    Keyword,
    Structured,
}

/// Classification of a detected range indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    HyphenRange,
    WordRange,
    BetweenRange,
    Negative,
    Ambiguous,
}

/// Range-indicator flag attached to MEASUREMENT / MONEY / DATE / TIME
/// mentions after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeFlag {
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<RangeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_span: Option<Span>,
}

impl RangeFlag {
    pub fn none() -> Self {
        Self {
            detected: false,
            kind: None,
            context: None,
            indicator_span: None,
        }
    }

    pub fn detected(kind: RangeKind, context: impl Into<String>, indicator_span: Span) -> Self {
        Self {
            detected: true,
            kind: Some(kind),
            context: Some(context.into()),
            indicator_span: Some(indicator_span),
        }
    }
}

impl Default for RangeFlag {
    fn default() -> Self {
        Self::none()
    }
}

/// One occurrence of an entity in a document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub span: Span,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ScannerSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_indicator: Option<RangeFlag>,
}

impl Mention {
    pub fn new(text: impl Into<String>, kind: EntityKind, span: Span, confidence: f64) -> Self {
        Self {
            text: text.into(),
            kind,
            span,
            confidence,
            subtype: None,
            source: None,
            range_indicator: None,
        }
    }

    pub fn with_source(mut self, source: ScannerSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_overlap_semantics() {
        let a = Span::new(0, 5);
        let b = Span::new(4, 8);
        let c = Span::new(5, 8);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // half-open: touching spans do not overlap
        assert!(a.overlaps_or_adjacent(&c, 2));
    }

    #[test]
    fn span_containment() {
        let outer = Span::new(10, 30);
        let inner = Span::new(12, 20);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
    }

    #[test]
    fn adjacency_margin() {
        let a = Span::new(0, 10);
        let b = Span::new(12, 15);
        assert!(a.overlaps_or_adjacent(&b, 2));
        assert!(!a.overlaps_or_adjacent(&b, 1));
    }
}
