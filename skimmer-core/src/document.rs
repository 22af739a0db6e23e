//! In-memory document model.
//!
//! One `Document` is exclusively owned by one compute worker from dequeue to
//! serialization; the canonical-entity table and mention lists are child
//! collections of the document, never shared across documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::CanonicalEntity;
use crate::error::FailureReason;
use crate::kind::EntityKind;
use crate::mention::Mention;

/// Lifecycle stage of a document inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ingested,
    Classified,
    Extracted,
    Normalized,
    Written,
    Failed,
}

/// Conversion provenance recorded by the ingestion worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub engine: String,
    pub page_count: u32,
    pub conversion_time_ms: f64,
    pub source_file: String,
    pub format: String,
}

impl Default for Conversion {
    fn default() -> Self {
        Self {
            engine: "skimmer".into(),
            page_count: 0,
            conversion_time_ms: 0.0,
            source_file: String::new(),
            format: "TXT".into(),
        }
    }
}

/// Cheap one-pass content flags recorded at ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFlags {
    pub has_tables: bool,
    pub has_images: bool,
    pub has_formulas: bool,
    pub has_code: bool,
    pub has_lists: bool,
    pub has_headers: bool,
}

/// Processing-state block of the frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Processing {
    pub stage: String,
    pub content_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

/// Router verdict plus analysis scores, persisted for observability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainClassification {
    pub routing: RoutingSummary,
    pub top_domains: Vec<String>,
    pub top_document_types: Vec<String>,
    pub domains: BTreeMap<String, f64>,
    pub document_types: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingSummary {
    pub skip_entity_extraction: bool,
    pub enable_deep_domain_extraction: bool,
    pub domain_specialization_route: String,
}

/// Normalization block: canonical entity table plus timing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationSummary {
    pub processing_time_ms: f64,
    pub canonical_entities: Vec<CanonicalEntity>,
}

/// Schemaed frontmatter with a catch-all extension map for keys the engine
/// does not own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    pub conversion: Conversion,
    pub content_analysis: serde_json::Map<String, serde_json::Value>,
    pub processing: Processing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_classification: Option<DomainClassification>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub raw_entities: BTreeMap<String, Vec<Mention>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalization: Option<NormalizationSummary>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Frontmatter {
    pub fn set_content_flags(&mut self, flags: ContentFlags) {
        let value = serde_json::to_value(flags).unwrap_or_default();
        if let serde_json::Value::Object(map) = value {
            for (k, v) in map {
                self.content_analysis.insert(k, v);
            }
        }
    }

    pub fn set_raw_entities(&mut self, mentions: &[Mention]) {
        self.raw_entities.clear();
        for kind in EntityKind::ALL {
            let of_kind: Vec<Mention> = mentions
                .iter()
                .filter(|m| m.kind == kind)
                .cloned()
                .collect();
            if !of_kind.is_empty() {
                self.raw_entities.insert(kind.label().to_string(), of_kind);
            }
        }
    }
}

/// An owned document moving through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source identifier, normally the input path.
    pub source: String,
    pub stage: Stage,
    pub body: String,
    /// Snapshot of the cleaned body taken just before the global rewrite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_body: Option<String>,
    pub frontmatter: Frontmatter,
    /// Opaque semantic-fact container written to the `.json` sidecar.
    pub facts: serde_json::Value,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
}

impl Document {
    pub fn new(source: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        let mut frontmatter = Frontmatter::default();
        frontmatter.processing.stage = "ingested".into();
        frontmatter.processing.content_length = body.len();
        Self {
            source: source.into(),
            stage: Stage::Ingested,
            body,
            clean_body: None,
            frontmatter,
            facts: serde_json::Value::Null,
            success: true,
            failure: None,
        }
    }

    /// File stem used to derive sibling output names.
    pub fn stem(&self) -> String {
        std::path::Path::new(&self.source)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }

    pub fn advance(&mut self, stage: Stage) {
        self.stage = stage;
        self.frontmatter.processing.stage = match stage {
            Stage::Ingested => "ingested",
            Stage::Classified => "classified",
            Stage::Extracted => "extracted",
            Stage::Normalized => "normalized",
            Stage::Written => "written",
            Stage::Failed => "failed",
        }
        .to_string();
    }

    pub fn fail(&mut self, reason: FailureReason) {
        self.success = false;
        self.failure = Some(reason);
        self.advance(Stage::Failed);
    }

    /// Truncates the body to `limit` bytes on a char boundary, appending a
    /// marker and flagging the frontmatter.
    pub fn truncate_body(&mut self, limit: usize) {
        if self.body.len() <= limit {
            return;
        }
        let mut cut = limit;
        while cut > 0 && !self.body.is_char_boundary(cut) {
            cut -= 1;
        }
        self.body.truncate(cut);
        self.body.push_str("\n[truncated]\n");
        self.frontmatter.processing.truncated = Some(true);
        self.frontmatter.processing.content_length = self.body.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_from_path() {
        let doc = Document::new("/data/in/report.final.pdf", "text");
        assert_eq!(doc.stem(), "report.final");
    }

    #[test]
    fn advance_updates_frontmatter_stage() {
        let mut doc = Document::new("a.txt", "text");
        doc.advance(Stage::Extracted);
        assert_eq!(doc.stage, Stage::Extracted);
        assert_eq!(doc.frontmatter.processing.stage, "extracted");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut doc = Document::new("a.txt", "héllo wörld".repeat(10));
        doc.truncate_body(7);
        assert!(doc.body.starts_with("héllo"));
        assert!(doc.body.ends_with("[truncated]\n"));
        assert_eq!(doc.frontmatter.processing.truncated, Some(true));
    }

    #[test]
    fn truncation_noop_under_limit() {
        let mut doc = Document::new("a.txt", "short");
        doc.truncate_body(1000);
        assert_eq!(doc.body, "short");
        assert_eq!(doc.frontmatter.processing.truncated, None);
    }

    #[test]
    fn failure_marks_stage() {
        let mut doc = Document::new("a.txt", "text");
        doc.fail(crate::error::FailureReason::timeout("exceeded 30s"));
        assert!(!doc.success);
        assert_eq!(doc.stage, Stage::Failed);
    }
}
