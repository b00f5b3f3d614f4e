//! Triple-pattern queries.

use std::fmt;

use crate::config::DEFAULT_SEARCH_LIMIT;

/// Reserved words of the literal query syntax. They are always matched as
/// plain terms, never interpreted as operators.
pub const RESERVED_KEYWORDS: &[&str] = &["AND", "OR", "NOT", "TO"];

/// A subject/predicate/object pattern. Unset positions are wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub limit: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            subject: None,
            predicate: None,
            object: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// How the object position should be matched.
    pub fn object_pattern(&self) -> Option<ObjectPattern> {
        self.object.as_deref().map(ObjectPattern::classify)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} {} {}) limit {}",
            self.subject.as_deref().unwrap_or("?s"),
            self.predicate.as_deref().unwrap_or("?p"),
            self.object
                .as_deref()
                .map(|o| format!("\"{o}\""))
                .unwrap_or_else(|| "?o".to_string()),
            self.limit
        )
    }
}

/// Interpretation of the object position of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPattern {
    /// Matches the object URI exactly.
    Uri(String),
    /// Matches a numeric literal with the same value.
    Numeric(f64),
    /// Matches literals containing every term (AND semantics).
    Terms(Vec<String>),
}

impl ObjectPattern {
    pub fn classify(object: &str) -> Self {
        let trimmed = object.trim();
        if is_uri(trimmed) {
            return ObjectPattern::Uri(trimmed.to_string());
        }
        if is_numeric(trimmed) {
            if let Ok(value) = trimmed.parse::<f64>() {
                return ObjectPattern::Numeric(value);
            }
        }
        ObjectPattern::Terms(tokenize(trimmed))
    }
}

/// Whether `s` is a syntactically valid absolute URI.
pub fn is_uri(s: &str) -> bool {
    if s.is_empty() || s.contains(char::is_whitespace) {
        return false;
    }
    match reqwest::Url::parse(s) {
        Ok(url) => !url.cannot_be_a_base() || url.scheme() == "urn",
        Err(_) => false,
    }
}

/// Digits with an optional sign and a single decimal point.
pub fn is_numeric(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || digits.starts_with('.') || digits.ends_with('.') {
        return false;
    }
    let mut seen_point = false;
    digits.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_point => {
            seen_point = true;
            true
        }
        _ => false,
    })
}

/// Split a literal into lower-cased alphanumeric terms.
///
/// Reserved keywords come out as ordinary lower-cased terms, which is how
/// they are escaped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
