//! Triples returned by a knowledge store.

use serde::{Deserialize, Serialize};

/// Object position of a fact: either another resource or a literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Object {
    Uri(String),
    Literal(String),
}

impl Object {
    pub fn as_str(&self) -> &str {
        match self {
            Object::Uri(s) | Object::Literal(s) => s,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Object::Uri(_))
    }

    /// The object as a resource URI, if it is one.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Object::Uri(s) => Some(s),
            Object::Literal(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

/// A (subject, predicate, object) triple: the unit of knowledge-base evidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub subject: String,
    pub predicate: String,
    pub object: Object,
}

impl Fact {
    /// Create a fact whose object is a resource.
    pub fn uri(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: Object::Uri(object.into()),
        }
    }

    /// Create a fact whose object is a literal.
    pub fn literal(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: Object::Literal(object.into()),
        }
    }

    /// A fact missing its predicate or object cannot be used as graph evidence.
    pub fn is_malformed(&self) -> bool {
        self.predicate.is_empty() || self.object.is_empty()
    }
}
