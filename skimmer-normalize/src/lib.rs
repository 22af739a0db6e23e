//! # Skimmer Normalization Layer
//!
//! **Entity canonicalization and global text replacement**
//!
//! Groups raw mentions into canonical entities with stable per-document IDs
//! (`p00001`, `org00042`, `gov00001`, ...) and rewrites every surface
//! mention in the body to `‖canonical‖id‖` markers via a second
//! Aho-Corasick pass.
//!
//! ### Components:
//! - `canonicalizer/`: per-kind grouping strategies and ID assignment
//! - `rewriter/`: end-to-start marker replacement with word boundaries
//! - `fingerprint/`: n-gram hash fingerprints for fuzzy name grouping
//! - per-kind parsers: `datetime`, `money`, `measurement`, `phone`,
//!   `regulation`, `contact`, `person`, `org`, `place`

pub mod canonicalizer;
pub mod contact;
pub mod datetime;
pub mod fingerprint;
pub mod measurement;
pub mod money;
pub mod org;
pub mod person;
pub mod phone;
pub mod place;
pub mod regulation;
pub mod rewriter;

pub use canonicalizer::Canonicalizer;
pub use rewriter::rewrite;
