//! ## skimmer-telemetry::metrics
//! **Prometheus counters and per-stage latency histograms**

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub documents_processed: Counter,
    pub documents_failed: Counter,
    pub queue_drops: Counter,
    pub routing_latency: Histogram,
    pub extraction_latency: Histogram,
    pub normalization_latency: Histogram,
    pub write_latency: Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn stage_histogram(name: &str, help: &str) -> Histogram {
    Histogram::with_opts(
        HistogramOpts::new(name, help)
            .buckets(vec![100_000.0, 1_000_000.0, 10_000_000.0, 100_000_000.0]),
    )
    .expect("valid histogram opts")
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let documents_processed =
            Counter::new("skimmer_documents_total", "Documents fully processed")
                .expect("valid counter");
        let documents_failed =
            Counter::new("skimmer_documents_failed_total", "Documents marked failed")
                .expect("valid counter");
        let queue_drops = Counter::new(
            "skimmer_queue_drops_total",
            "Files dropped on full-queue timeout",
        )
        .expect("valid counter");

        let routing_latency =
            stage_histogram("skimmer_routing_latency_ns", "Router analysis time");
        let extraction_latency =
            stage_histogram("skimmer_extraction_latency_ns", "Raw extraction time");
        let normalization_latency = stage_histogram(
            "skimmer_normalization_latency_ns",
            "Canonicalization and rewrite time",
        );
        let write_latency = stage_histogram("skimmer_write_latency_ns", "Batch write time");

        registry
            .register(Box::new(documents_processed.clone()))
            .expect("register once");
        registry
            .register(Box::new(documents_failed.clone()))
            .expect("register once");
        registry
            .register(Box::new(queue_drops.clone()))
            .expect("register once");
        registry
            .register(Box::new(routing_latency.clone()))
            .expect("register once");
        registry
            .register(Box::new(extraction_latency.clone()))
            .expect("register once");
        registry
            .register(Box::new(normalization_latency.clone()))
            .expect("register once");
        registry
            .register(Box::new(write_latency.clone()))
            .expect("register once");

        Self {
            registry,
            documents_processed,
            documents_failed,
            queue_drops,
            routing_latency,
            extraction_latency,
            normalization_latency,
            write_latency,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.documents_processed.inc();
        metrics.documents_processed.inc();
        assert_eq!(metrics.documents_processed.get(), 2.0);
    }

    #[test]
    fn gather_renders_text() {
        let metrics = MetricsRecorder::new();
        metrics.documents_failed.inc();
        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("skimmer_documents_failed_total"));
    }
}
