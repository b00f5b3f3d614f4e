//! Knowledge base access for entity disambiguation.
//!
//! The pipeline only ever talks to a knowledge base through the
//! [`KnowledgeStore`] triple-pattern contract:
//!
//! - unset subject/predicate/object positions are wildcards
//! - an object that is a URI matches the object URI, a purely numeric object
//!   matches a numeric literal, anything else matches literals by AND-combined
//!   terms (reserved words `AND OR NOT TO` are plain terms)
//! - results are capped at the query limit, ranked by relevance and
//!   deterministic for an unchanged store
//! - "no results" is `Ok(vec![])`; a failed lookup is an `Err`
//!
//! # Components
//!
//! - [`MemoryStore`] - in-memory triple index, loadable from N-Triples
//! - [`HttpStore`] - client for a remote triple index
//! - [`CachedStore`] - bounded result cache in front of any store
//!
//! # Example
//!
//! ```ignore
//! use ned_core::knowledge::{KnowledgeStore, MemoryStore, Query};
//!
//! let kb = MemoryStore::from_ntriples("dbpedia-sample.nt")?;
//! let hits = kb.search(&Query::new().predicate(RDFS_LABEL).object("Berlin")).await?;
//! ```

mod cached;
mod error;
mod http;
mod memory;
pub mod models;
mod ntriples;
pub mod vocab;

pub use cached::CachedStore;
pub use error::KnowledgeError;
pub use http::HttpStore;
pub use memory::MemoryStore;
pub use models::{Fact, Object, ObjectPattern, Query};

use async_trait::async_trait;

/// Pattern-based triple lookup.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Find facts matching the query pattern.
    async fn search(&self, query: &Query) -> Result<Vec<Fact>, KnowledgeError>;
}
