//! # Skimmer Scanner Engines
//!
//! **Multi-pattern keyword matching and typed regex scanning**
//!
//! ### Components:
//! - `keyword/`: Aho-Corasick matcher over named pattern sets
//! - `regexes/`: compiled typed patterns with priorities
//! - `patterns/`: line-oriented pattern-file and reference-file loading
//! - `cache/`: content-hash-keyed corpus cache for large pattern sets
//!
//! Both engines are built once at startup and shared read-only across all
//! compute workers.

pub mod cache;
pub mod error;
pub mod keyword;
pub mod patterns;
pub mod regexes;

pub use error::ScanError;
pub use keyword::{KeywordMatch, KeywordScanner, PatternSet};
pub use regexes::{PatternSelection, Priority, RegexScanner, TypedMatch};
