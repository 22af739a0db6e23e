//! # Skimmer Output Serializer
//!
//! Writes two sibling files per document:
//!
//! - `<stem>.md`: YAML frontmatter between `---` delimiters, then the
//!   rewritten body
//! - `<stem>.json`: the semantic-fact container
//!
//! Frontmatter section order is fixed: `conversion`, `content_analysis`,
//! `processing`, `domain_classification`, then remaining keys. Writes go
//! to a temp file and are renamed into place, so a failure mid-batch
//! leaves previously written siblings intact. Batch writes serialize under
//! one directory mutex.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, warn};

use skimmer_core::document::Document;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("frontmatter serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("fact serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializer over one output directory.
pub struct OutputWriter {
    directory: PathBuf,
    lock: Mutex<()>,
}

impl OutputWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self {
            directory,
            lock: Mutex::new(()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes a batch under the directory lock. Returns one result per
    /// document, in order; a failed document gets a `.err` sidecar when
    /// feasible.
    pub fn write_batch(&self, documents: &[Document]) -> Vec<Result<(), OutputError>> {
        let _guard = self.lock.lock();
        documents
            .iter()
            .map(|doc| {
                let result = self.write_document(doc);
                if let Err(err) = &result {
                    warn!(source = %doc.source, error = %err, "document write failed");
                    self.write_error_sidecar(doc, &err.to_string());
                }
                result
            })
            .collect()
    }

    fn write_document(&self, doc: &Document) -> Result<(), OutputError> {
        let stem = doc.stem();
        let frontmatter = render_frontmatter(doc)?;
        let markdown = format!("---\n{frontmatter}---\n{}", doc.body);
        self.write_atomic(&format!("{stem}.md"), markdown.as_bytes())?;

        let facts = if doc.facts.is_null() {
            empty_fact_container()
        } else {
            doc.facts.clone()
        };
        let json = serde_json::to_string_pretty(&facts)?;
        self.write_atomic(&format!("{stem}.json"), json.as_bytes())?;

        debug!(source = %doc.source, stem = %stem, "document written");
        Ok(())
    }

    /// Best-effort `.err` sidecar for a failed document.
    pub fn write_error_sidecar(&self, doc: &Document, message: &str) {
        let path = self.directory.join(format!("{}.err", doc.stem()));
        let body = match &doc.failure {
            Some(reason) => format!("{}\n{message}\n", reason),
            None => format!("{message}\n"),
        };
        if let Err(err) = fs::write(&path, body) {
            warn!(path = %path.display(), error = %err, "error sidecar write failed");
        }
    }

    /// Write-to-temp then rename; readers never observe partial files.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<(), OutputError> {
        let final_path = self.directory.join(name);
        let tmp_path = self.directory.join(format!("{name}.tmp"));
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

/// Renders the frontmatter with the fixed section order.
fn render_frontmatter(doc: &Document) -> Result<String, serde_yaml::Error> {
    let fm = &doc.frontmatter;
    let mut mapping = Mapping::new();

    mapping.insert(
        Value::String("conversion".into()),
        serde_yaml::to_value(&fm.conversion)?,
    );
    mapping.insert(
        Value::String("content_analysis".into()),
        serde_yaml::to_value(&fm.content_analysis)?,
    );
    mapping.insert(
        Value::String("processing".into()),
        serde_yaml::to_value(&fm.processing)?,
    );
    if let Some(classification) = &fm.domain_classification {
        mapping.insert(
            Value::String("domain_classification".into()),
            serde_yaml::to_value(classification)?,
        );
    }
    if !fm.raw_entities.is_empty() {
        mapping.insert(
            Value::String("raw_entities".into()),
            serde_yaml::to_value(&fm.raw_entities)?,
        );
    }
    if let Some(normalization) = &fm.normalization {
        mapping.insert(
            Value::String("normalization".into()),
            serde_yaml::to_value(normalization)?,
        );
    }
    for (key, value) in &fm.extra {
        mapping.insert(Value::String(key.clone()), serde_yaml::to_value(value)?);
    }

    serde_yaml::to_string(&mapping)
}

fn empty_fact_container() -> serde_json::Value {
    serde_json::json!({
        "facts": [],
        "rules": [],
        "relationships": [],
        "semantic_summary": {}
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use skimmer_core::document::{NormalizationSummary, Stage};
    use skimmer_core::error::FailureReason;

    fn doc(stem: &str) -> Document {
        let mut doc = Document::new(format!("/in/{stem}.txt"), "rewritten body\n");
        doc.advance(Stage::Normalized);
        doc.frontmatter.normalization = Some(NormalizationSummary::default());
        doc
    }

    #[test]
    fn writes_sibling_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let results = writer.write_batch(&[doc("report")]);
        assert!(results[0].is_ok());
        assert!(dir.path().join("report.md").exists());
        assert!(dir.path().join("report.json").exists());
    }

    #[test]
    fn frontmatter_sections_in_fixed_order() {
        let rendered = render_frontmatter(&doc("a")).unwrap();
        let conversion = rendered.find("conversion:").unwrap();
        let analysis = rendered.find("content_analysis:").unwrap();
        let processing = rendered.find("processing:").unwrap();
        let normalization = rendered.find("normalization:").unwrap();
        assert!(conversion < analysis);
        assert!(analysis < processing);
        assert!(processing < normalization);
    }

    #[test]
    fn markdown_carries_frontmatter_then_body() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        writer.write_batch(&[doc("report")]);
        let content = fs::read_to_string(dir.path().join("report.md")).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.ends_with("---\nrewritten body\n"));
    }

    #[test]
    fn default_fact_container_when_facts_missing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        writer.write_batch(&[doc("report")]);
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert!(json["facts"].is_array());
        assert!(json["semantic_summary"].is_object());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        writer.write_batch(&[doc("a"), doc("b")]);
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn error_sidecar_carries_reason() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let mut failed = doc("bad");
        failed.fail(FailureReason::write("disk full"));
        writer.write_error_sidecar(&failed, "disk full");
        let content = fs::read_to_string(dir.path().join("bad.err")).unwrap();
        assert!(content.contains("disk full"));
    }
}
