pub mod cache;
pub mod candidates;
pub mod config;
pub mod disambiguator;
pub mod document;
pub mod error;
pub mod graph;
pub mod knowledge;
pub mod normalize;
pub mod ranking;
pub mod similarity;
pub mod whitelist;

pub use config::Config;
pub use disambiguator::{open_context_store, open_store, Disambiguator};
pub use document::{CandidateDump, Document, DocumentInput, DocumentResult, Mention};
pub use error::NedError;
pub use graph::DisambiguationGraph;
pub use knowledge::{KnowledgeStore, MemoryStore};
pub use ranking::{LinkRanker, ScoreTable};
pub use whitelist::DomainWhitelist;
