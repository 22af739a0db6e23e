//! # Skimmer Extraction Layer
//!
//! **Content routing and raw mention extraction**
//!
//! ### Components:
//! - `router/`: one-pass content analysis driving scanner dispatch
//! - `cleaner/`: whitespace normalization and near-duplicate line removal
//! - `sentences/`: terminator-based sentence splitting with offsets
//! - `extractor/`: scanner orchestration, filters, and conflict resolution
//! - `org/`: evidence-scored validation of organization candidates
//! - `person/`: corpus- and context-backed person validation

pub mod cleaner;
pub mod extractor;
pub mod org;
pub mod person;
pub mod router;
pub mod sentences;

pub use extractor::{ExtractionOutcome, RawExtractor};
pub use router::{ContentRouter, Genre, RoutingDecision, Strategy};
