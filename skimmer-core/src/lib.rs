//! # skimmer-core
//!
//! Foundation layer for the Skimmer extraction engine.
//! Owns the shared data model every other crate speaks:
//!
//! ### Key Submodules:
//! - `kind`: the closed `EntityKind` enum and per-kind ID prefixes
//! - `mention`: byte spans, raw mentions, range-indicator flags
//! - `entity`: canonical entities and their per-kind metadata
//! - `document`: the in-memory document with frontmatter and lifecycle stage
//! - `queue`: bounded blocking work queue between ingestion and compute
//! - `error`: the run-wide error taxonomy

pub mod document;
pub mod entity;
pub mod error;
pub mod kind;
pub mod mention;
pub mod queue;

pub mod prelude {
    pub use crate::document::*;
    pub use crate::entity::*;
    pub use crate::error::*;
    pub use crate::kind::*;
    pub use crate::mention::*;
    pub use crate::queue::*;
}
