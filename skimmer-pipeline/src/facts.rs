//! Semantic-fact hook.
//!
//! Runs once per document on the owning compute worker, reading the
//! pre-rewrite `clean_body`. The returned value is written verbatim to the
//! `.json` sidecar; the engine treats it as opaque.

use serde_json::{json, Value};

pub trait FactExtractor: Send + Sync {
    fn extract(&self, clean_body: &str) -> Value;
}

/// Default hook: an empty fact container.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFactExtractor;

impl FactExtractor for NoopFactExtractor {
    fn extract(&self, _clean_body: &str) -> Value {
        json!({
            "facts": [],
            "rules": [],
            "relationships": [],
            "semantic_summary": {}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_returns_empty_container() {
        let value = NoopFactExtractor.extract("any body");
        assert_eq!(value["facts"], json!([]));
        assert_eq!(value["semantic_summary"], json!({}));
    }
}
