//! Knowledge store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while querying or loading a knowledge store.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// A lookup against the store failed (index or parse error on the store side).
    #[error("Lookup failed for {query}: {message}")]
    LookupFailed { query: String, message: String },

    /// Network error talking to a remote store.
    #[error("Network error: {0}")]
    Network(String),

    /// A remote store answered with a non-success status.
    #[error("Store returned error: {status} - {message}")]
    Http { status: u16, message: String },

    /// A fact with an empty predicate or object.
    #[error("Malformed fact for subject {subject}")]
    MalformedFact { subject: String },

    /// N-Triples (or other fixture) parse error.
    #[error("Parse error in {path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl KnowledgeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KnowledgeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from answering a query, as opposed to loading data.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            KnowledgeError::LookupFailed { .. }
                | KnowledgeError::Network(_)
                | KnowledgeError::Http { .. }
        )
    }
}

impl From<std::io::Error> for KnowledgeError {
    fn from(err: std::io::Error) -> Self {
        KnowledgeError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<reqwest::Error> for KnowledgeError {
    fn from(err: reqwest::Error) -> Self {
        KnowledgeError::Network(err.to_string())
    }
}
