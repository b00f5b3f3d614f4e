//! Pipeline-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::knowledge::KnowledgeError;

/// Errors surfaced by the disambiguation pipeline.
///
/// Lookup failures for a single mention are recovered inside the pipeline and
/// never reach this type; an empty candidate set is not an error either.
#[derive(Debug, Error)]
pub enum NedError {
    /// Rejected at construction time.
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(#[from] ConfigError),

    /// No mention of the document could be looked up.
    #[error("Document {document} failed: {message}")]
    DocumentFailed { document: String, message: String },

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    /// Malformed `<entity>` markup.
    #[error("Malformed entity markup: {0}")]
    Markup(String),
}
