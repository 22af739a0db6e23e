//! # Skimmer Telemetry
//!
//! Crate for structured logging and pipeline metrics.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
