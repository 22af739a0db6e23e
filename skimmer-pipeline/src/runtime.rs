//! Pipeline runtime: scanner construction, worker pool, document flow.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use skimmer_config::SkimmerConfig;
use skimmer_core::document::{Document, DomainClassification, NormalizationSummary, RoutingSummary, Stage};
use skimmer_core::error::{ErrorKind, FailureReason};
use skimmer_core::queue::{WorkItem, WorkQueue};
use skimmer_extract::cleaner::clean_text;
use skimmer_extract::router::RoutingDecision;
use skimmer_extract::{ContentRouter, RawExtractor, Strategy};
use skimmer_normalize::{rewrite, Canonicalizer};
use skimmer_output::OutputWriter;
use skimmer_scanners::cache::CorpusCache;
use skimmer_scanners::patterns::{load_all_sets, parse_government_records, GovernmentRecord};
use skimmer_scanners::{KeywordScanner, PatternSet, RegexScanner};
use skimmer_telemetry::MetricsRecorder;

use crate::error::PipelineError;
use crate::facts::{FactExtractor, NoopFactExtractor};
use crate::ingest::{run_ingestion, IngestStats};
use crate::summary::RunSummary;

/// Shared error tallies, merged into the run summary at the end.
#[derive(Default)]
struct ErrorTally {
    counts: Mutex<BTreeMap<&'static str, usize>>,
}

impl ErrorTally {
    fn record(&self, kind: ErrorKind) {
        *self.counts.lock().entry(kind.label()).or_insert(0) += 1;
    }
}

/// The assembled engine: immutable scanners plus configuration, shared by
/// every compute worker.
pub struct Pipeline {
    config: SkimmerConfig,
    router: ContentRouter,
    regex: Arc<RegexScanner>,
    extractor: Arc<RawExtractor>,
    canonicalizer: Arc<Canonicalizer>,
    writer: Arc<OutputWriter>,
    metrics: MetricsRecorder,
    facts: Arc<dyn FactExtractor>,
}

impl Pipeline {
    /// Builds scanners and the output writer from configuration. Pattern
    /// build failures are fatal; regex compile failures degrade.
    pub fn new(config: SkimmerConfig, metrics: MetricsRecorder) -> Result<Self, PipelineError> {
        let keyword = Arc::new(build_keyword_scanner(&config)?);
        let regex = Arc::new(build_regex_scanner(&config)?);
        let governments = load_governments(&config)?;

        let router = ContentRouter::new(config.router.clone());
        let extractor = Arc::new(RawExtractor::new(
            keyword,
            Arc::clone(&regex),
            config.extractor.clone(),
        ));
        let canonicalizer = Arc::new(Canonicalizer::new(config.normalize.clone(), governments));
        let writer = Arc::new(OutputWriter::new(config.output.directory.clone())?);

        Ok(Self {
            config,
            router,
            regex,
            extractor,
            canonicalizer,
            writer,
            metrics,
            facts: Arc::new(NoopFactExtractor),
        })
    }

    /// Replaces the semantic-fact hook.
    pub fn with_fact_extractor(mut self, facts: Arc<dyn FactExtractor>) -> Self {
        self.facts = facts;
        self
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Processes `files` to completion and returns the run summary.
    pub fn run(&self, files: &[PathBuf]) -> Result<RunSummary, PipelineError> {
        self.run_with_stop(files, &AtomicBool::new(true))
    }

    /// Like [`run`](Self::run), but polls `active` between documents; clear
    /// it to request shutdown. In-flight documents complete and are
    /// written.
    #[instrument(skip_all, fields(files = files.len()))]
    pub fn run_with_stop(
        &self,
        files: &[PathBuf],
        active: &AtomicBool,
    ) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let workers = self.config.pipeline.resolved_workers();
        let queue = WorkQueue::bounded(self.config.pipeline.queue_capacity)
            .expect("validated queue capacity");

        let ingest_stats = IngestStats::new();
        let processed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let tally = ErrorTally::default();

        info!(workers, "pipeline starting");
        let panicked = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers + 1);
            handles.push(scope.spawn(|| {
                run_ingestion(
                    files,
                    &queue,
                    &self.config.pipeline,
                    workers,
                    active,
                    &ingest_stats,
                );
            }));

            for worker_id in 0..workers {
                let queue = queue.clone();
                let processed = &processed;
                let failed = &failed;
                let tally = &tally;
                handles.push(scope.spawn(move || {
                    self.compute_loop(worker_id, queue, active, processed, failed, tally);
                }));
            }

            let mut panicked = false;
            for handle in handles {
                panicked |= handle.join().is_err();
            }
            panicked
        });
        if panicked {
            return Err(PipelineError::WorkerPanic);
        }

        let mut summary = RunSummary {
            processed: processed.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            dropped: ingest_stats.dropped.load(Ordering::Relaxed),
            error_counts: tally.counts.lock().clone(),
            wall_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        let read_failures = ingest_stats.read_failures.load(Ordering::Relaxed);
        if read_failures > 0 {
            summary.failed += read_failures;
            *summary.error_counts.entry(ErrorKind::Ingestion.label()).or_insert(0) +=
                read_failures;
        }
        for _ in 0..summary.dropped {
            self.metrics.queue_drops.inc();
            *summary
                .error_counts
                .entry(ErrorKind::QueueBackpressureDrop.label())
                .or_insert(0) += 1;
        }

        info!(
            processed = summary.processed,
            failed = summary.failed,
            dropped = summary.dropped,
            wall_time_ms = summary.wall_time_ms,
            "pipeline finished"
        );
        Ok(summary)
    }

    fn compute_loop(
        &self,
        worker_id: usize,
        queue: WorkQueue,
        active: &AtomicBool,
        processed: &AtomicUsize,
        failed: &AtomicUsize,
        tally: &ErrorTally,
    ) {
        let pop_timeout = Duration::from_secs(self.config.pipeline.queue_push_timeout_secs);
        let batch_size = self.config.pipeline.batch_size;
        let mut batch: Vec<Document> = Vec::with_capacity(batch_size);
        debug!(worker_id, "compute worker started");

        loop {
            match queue.pop_timeout(pop_timeout) {
                Some(WorkItem::Shutdown) => break,
                Some(WorkItem::Doc(doc)) => {
                    let doc = self.process_document(*doc, tally);
                    batch.push(doc);
                    if batch.len() >= batch_size {
                        self.flush(&mut batch, processed, failed, tally);
                    }
                }
                // Bounded wait elapsed; keep draining until the sentinel
                // arrives, even after a stop request.
                None => continue,
            }
        }

        self.flush(&mut batch, processed, failed, tally);
        debug!(worker_id, "compute worker finished");
    }

    /// Runs route -> clean -> extract -> canonicalize -> rewrite -> facts
    /// for one document.
    fn process_document(&self, mut doc: Document, tally: &ErrorTally) -> Document {
        let started = Instant::now();
        let deadline = (self.config.pipeline.document_timeout_secs > 0)
            .then(|| Duration::from_secs(self.config.pipeline.document_timeout_secs));
        let over_deadline = |started: &Instant| deadline.is_some_and(|d| started.elapsed() > d);

        // Routing runs on the raw body.
        let route_started = Instant::now();
        let decision = self.router.route(&doc.body, &self.regex);
        self.metrics
            .routing_latency
            .observe(route_started.elapsed().as_nanos() as f64);
        annotate_routing(&mut doc, &decision);
        doc.advance(Stage::Classified);

        // Cleaning rewrites the body in place; all downstream spans index
        // the cleaned text.
        doc.body = clean_text(&doc.body, self.config.extractor.near_duplicate_similarity);
        doc.frontmatter.processing.content_length = doc.body.len();

        if over_deadline(&started) {
            doc.fail(FailureReason::timeout("document processing timeout"));
            tally.record(ErrorKind::Timeout);
            return doc;
        }

        let extract_started = Instant::now();
        let outcome = self.extractor.extract(&doc.body, &decision);
        self.metrics
            .extraction_latency
            .observe(extract_started.elapsed().as_nanos() as f64);
        if outcome.degraded {
            tally.record(ErrorKind::ScannerDegraded);
            for warning in &outcome.warnings {
                warn!(source = %doc.source, warning = %warning, "extraction degraded");
            }
        }
        doc.frontmatter.set_raw_entities(&outcome.mentions);
        annotate_entity_insights(&mut doc, outcome.mentions.len());
        doc.advance(Stage::Extracted);

        if over_deadline(&started) {
            doc.fail(FailureReason::timeout("document processing timeout"));
            tally.record(ErrorKind::Timeout);
            return doc;
        }

        let normalize_started = Instant::now();
        let entities = self.canonicalizer.canonicalize(&outcome.mentions);
        for entity in &entities {
            if matches!(
                entity.metadata,
                Some(skimmer_core::entity::EntityMetadata::ParseError(_))
            ) {
                tally.record(ErrorKind::Parse);
            }
        }

        doc.clean_body = Some(doc.body.clone());
        doc.body = rewrite(&doc.body, &entities);
        doc.frontmatter.normalization = Some(NormalizationSummary {
            processing_time_ms: normalize_started.elapsed().as_secs_f64() * 1000.0,
            canonical_entities: entities,
        });
        self.metrics
            .normalization_latency
            .observe(normalize_started.elapsed().as_nanos() as f64);
        doc.advance(Stage::Normalized);

        let clean_body = doc.clean_body.as_deref().unwrap_or_default();
        doc.facts = self.facts.extract(clean_body);
        doc
    }

    fn flush(
        &self,
        batch: &mut Vec<Document>,
        processed: &AtomicUsize,
        failed: &AtomicUsize,
        tally: &ErrorTally,
    ) {
        if batch.is_empty() {
            return;
        }
        let (ok, bad): (Vec<Document>, Vec<Document>) =
            batch.drain(..).partition(|doc| doc.success);

        // Failed documents get an error sidecar, never a normal pair.
        for doc in &bad {
            let message = doc
                .failure
                .as_ref()
                .map(|reason| reason.to_string())
                .unwrap_or_else(|| "document failed".to_string());
            self.writer.write_error_sidecar(doc, &message);
            failed.fetch_add(1, Ordering::Relaxed);
            self.metrics.documents_failed.inc();
        }

        if ok.is_empty() {
            return;
        }
        let write_started = Instant::now();
        let results = self.writer.write_batch(&ok);
        self.metrics
            .write_latency
            .observe(write_started.elapsed().as_nanos() as f64);

        for result in &results {
            if result.is_err() {
                tally.record(ErrorKind::Write);
                failed.fetch_add(1, Ordering::Relaxed);
                self.metrics.documents_failed.inc();
            } else {
                processed.fetch_add(1, Ordering::Relaxed);
                self.metrics.documents_processed.inc();
            }
        }
    }
}

fn annotate_routing(doc: &mut Document, decision: &RoutingDecision) {
    let analysis = &decision.analysis;
    let fm = &mut doc.frontmatter;
    fm.content_analysis.insert(
        "char_count".into(),
        serde_json::Value::from(analysis.char_count),
    );
    fm.content_analysis.insert(
        "word_count".into(),
        serde_json::Value::from(analysis.word_count),
    );
    fm.content_analysis.insert(
        "avg_word_length".into(),
        serde_json::Value::from(analysis.avg_word_length),
    );
    fm.content_analysis.insert(
        "keyword_density".into(),
        serde_json::Value::from(analysis.keyword_density),
    );
    fm.content_analysis.insert(
        "structured_density".into(),
        serde_json::Value::from(analysis.structured_density),
    );

    let route = match decision.strategy {
        Strategy::KeywordsOnly => "keywords_only",
        Strategy::PatternsOnly => "patterns_only",
        Strategy::Hybrid => "hybrid",
    };
    let mut top_domains: Vec<(String, f64)> = analysis
        .genre_scores
        .iter()
        .filter(|(_, score)| **score > 0.0)
        .map(|(name, score)| (name.clone(), *score))
        .collect();
    top_domains.sort_by(|a, b| b.1.total_cmp(&a.1));

    doc.frontmatter.domain_classification = Some(DomainClassification {
        routing: RoutingSummary {
            skip_entity_extraction: false,
            enable_deep_domain_extraction: false,
            domain_specialization_route: route.to_string(),
        },
        top_domains: top_domains.iter().take(3).map(|(n, _)| n.clone()).collect(),
        top_document_types: vec![analysis.genre.label().to_string()],
        domains: analysis.genre_scores.clone(),
        document_types: BTreeMap::from([(
            analysis.genre.label().to_string(),
            decision.confidence,
        )]),
    });
    doc.frontmatter.extra.insert(
        "routing_reasoning".into(),
        serde_json::Value::String(decision.reasoning.clone()),
    );
}

fn annotate_entity_insights(doc: &mut Document, total: usize) {
    let per_kind: serde_json::Map<String, serde_json::Value> = doc
        .frontmatter
        .raw_entities
        .iter()
        .map(|(kind, mentions)| (kind.clone(), serde_json::Value::from(mentions.len())))
        .collect();
    doc.frontmatter.extra.insert(
        "entity_insights".into(),
        serde_json::json!({
            "total_entities_found": total,
            "by_kind": per_kind,
        }),
    );
}

fn build_keyword_scanner(config: &SkimmerConfig) -> Result<KeywordScanner, PipelineError> {
    let mut scanner = KeywordScanner::new();
    let cache = CorpusCache::new(config.patterns.cache_directory.clone());

    for set in load_all_sets(&config.patterns.directory)? {
        // The name corpora are large and untyped; they go through the
        // content-hash cache.
        if set.name == "first_names" || set.name == "last_names" {
            let dir = config.patterns.directory.join(&set.name);
            let mut sources: Vec<PathBuf> = fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
                .collect();
            sources.sort();
            let terms = cache.load_or_build(&set.name, &sources)?;
            let entries = terms.into_iter().map(|t| (t, String::new()));
            scanner.insert(PatternSet::build(set.name, entries, true)?);
            continue;
        }
        scanner.insert(PatternSet::build(
            set.name,
            set.entries,
            set.case_insensitive,
        )?);
    }
    Ok(scanner)
}

fn build_regex_scanner(config: &SkimmerConfig) -> Result<RegexScanner, PipelineError> {
    if config.patterns.regex_file.exists() {
        let content = fs::read_to_string(&config.patterns.regex_file)?;
        let (scanner, failures) = RegexScanner::from_yaml(&content)?;
        for failure in &failures {
            warn!(pattern = %failure.name, error = %failure.message, "pattern skipped");
        }
        Ok(scanner)
    } else {
        Ok(RegexScanner::with_defaults())
    }
}

fn load_governments(config: &SkimmerConfig) -> Result<Vec<GovernmentRecord>, PipelineError> {
    let path = config.patterns.directory.join("governments.txt");
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(parse_government_records(&fs::read_to_string(path)?))
}
