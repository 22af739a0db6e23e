//! Run-wide error taxonomy.
//!
//! Scanner-local and parse-local failures are recovered and annotated into
//! the owning document; file-level failures fail only that document;
//! pattern-build failures are fatal before processing starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories surfaced in the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Ingestion,
    PatternBuild,
    ScannerDegraded,
    Parse,
    Write,
    Timeout,
    QueueBackpressureDrop,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Ingestion => "ingestion",
            ErrorKind::PatternBuild => "pattern_build",
            ErrorKind::ScannerDegraded => "scanner_degraded",
            ErrorKind::Parse => "parse",
            ErrorKind::Write => "write",
            ErrorKind::Timeout => "timeout",
            ErrorKind::QueueBackpressureDrop => "queue_backpressure_drop",
        }
    }
}

/// Why a document ended in the `Failed` stage.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct FailureReason {
    pub kind: ErrorKind,
    pub message: String,
}

impl FailureReason {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn ingestion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Ingestion, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Write, message)
    }
}
