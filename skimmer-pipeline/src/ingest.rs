//! Ingestion worker: file reading, document construction, queue feeding.
//!
//! Exactly one ingestion thread runs per pipeline. It reads source files in
//! order, truncates oversized bodies, records content flags and conversion
//! provenance, and pushes work items with a bounded wait; a full queue past
//! the timeout drops the file with a warning. On completion it pushes one
//! shutdown sentinel per compute worker.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use skimmer_config::PipelineConfig;
use skimmer_core::document::{ContentFlags, Document};
use skimmer_core::queue::{QueueError, WorkItem, WorkQueue};

/// Shared drop counter bumped on queue-backpressure drops.
pub struct IngestStats {
    pub dropped: AtomicUsize,
    pub read_failures: AtomicUsize,
}

impl IngestStats {
    pub fn new() -> Self {
        Self {
            dropped: AtomicUsize::new(0),
            read_failures: AtomicUsize::new(0),
        }
    }
}

impl Default for IngestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the ingestion loop; returns when every file is queued (or dropped)
/// and all sentinels are delivered.
pub fn run_ingestion(
    files: &[PathBuf],
    queue: &WorkQueue,
    config: &PipelineConfig,
    workers: usize,
    active: &AtomicBool,
    stats: &IngestStats,
) {
    let push_timeout = Duration::from_secs(config.queue_push_timeout_secs);
    info!(files = files.len(), "ingestion started");

    for path in files {
        if !active.load(Ordering::Relaxed) {
            break;
        }
        let started = Instant::now();
        let doc = match ingest_file(path, config) {
            Ok(mut doc) => {
                doc.frontmatter.conversion.conversion_time_ms =
                    started.elapsed().as_secs_f64() * 1000.0;
                doc
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "file unreadable, skipped");
                stats.read_failures.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        };

        match queue.push_timeout(WorkItem::Doc(Box::new(doc)), push_timeout) {
            Ok(()) => debug!(path = %path.display(), "document queued"),
            Err(QueueError::Full(_)) => {
                warn!(path = %path.display(), "queue full, dropping file");
                stats.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                warn!("work queue disconnected, stopping ingestion");
                break;
            }
        }
    }

    for _ in 0..workers {
        if queue.push(WorkItem::Shutdown).is_err() {
            break;
        }
    }
    info!("ingestion complete");
}

fn ingest_file(path: &Path, config: &PipelineConfig) -> std::io::Result<Document> {
    let content = fs::read_to_string(path)?;
    let mut doc = Document::new(path.to_string_lossy().into_owned(), content);
    doc.truncate_body(config.memory_limit_bytes());

    doc.frontmatter.conversion.source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    doc.frontmatter.conversion.format = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "TXT".into());
    doc.frontmatter.conversion.page_count = 0;

    let flags = scan_content_flags(&doc.body);
    doc.frontmatter.set_content_flags(flags);
    Ok(doc)
}

/// One cheap pass for structural markdown flags.
pub fn scan_content_flags(body: &str) -> ContentFlags {
    let mut flags = ContentFlags::default();
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('|') {
            flags.has_tables = true;
        }
        if trimmed.starts_with('#') {
            flags.has_headers = true;
        }
        if trimmed.starts_with("```") {
            flags.has_code = true;
        }
        if trimmed.starts_with("- ")
            || trimmed.starts_with("* ")
            || trimmed
                .split_once(". ")
                .is_some_and(|(head, _)| head.chars().all(|c| c.is_ascii_digit()) && !head.is_empty())
        {
            flags.has_lists = true;
        }
        if trimmed.contains("![") {
            flags.has_images = true;
        }
        if trimmed.matches('$').count() >= 2 {
            flags.has_formulas = true;
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_flags_detect_structures() {
        let body = "# Title\n\n| a | b |\n\n- item\n\n```rust\ncode\n```\n\n![img](x.png)\n\n$x$ equals $y$\n";
        let flags = scan_content_flags(body);
        assert!(flags.has_headers);
        assert!(flags.has_tables);
        assert!(flags.has_lists);
        assert!(flags.has_code);
        assert!(flags.has_images);
        assert!(flags.has_formulas);
    }

    #[test]
    fn plain_text_has_no_flags() {
        let flags = scan_content_flags("just a paragraph of text");
        assert_eq!(flags, ContentFlags::default());
    }

    #[test]
    fn ingest_reads_and_annotates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        fs::write(&path, "# hello\nworld").unwrap();

        let doc = ingest_file(&path, &PipelineConfig::default()).unwrap();
        assert_eq!(doc.frontmatter.conversion.source_file, "note.md");
        assert_eq!(doc.frontmatter.conversion.format, "MD");
        assert_eq!(
            doc.frontmatter.content_analysis.get("has_headers"),
            Some(&serde_json::Value::Bool(true))
        );
    }

    #[test]
    fn oversized_body_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, "x".repeat(2 * 1024 * 1024)).unwrap();

        let mut config = PipelineConfig::default();
        config.memory_limit_mb = 1;
        let doc = ingest_file(&path, &config).unwrap();
        assert!(doc.body.len() < 2 * 1024 * 1024);
        assert_eq!(doc.frontmatter.processing.truncated, Some(true));
    }

    #[test]
    fn sentinels_delivered_per_worker() {
        let queue = WorkQueue::bounded(8).unwrap();
        let active = AtomicBool::new(true);
        let stats = IngestStats::new();
        run_ingestion(
            &[],
            &queue,
            &PipelineConfig::default(),
            3,
            &active,
            &stats,
        );
        let mut sentinels = 0;
        while let Some(item) = queue.pop_timeout(Duration::from_millis(10)) {
            assert!(matches!(item, WorkItem::Shutdown));
            sentinels += 1;
        }
        assert_eq!(sentinels, 3);
    }
}
