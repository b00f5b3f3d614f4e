//! Data models for knowledge store lookups.

mod fact;
mod query;

pub use fact::{Fact, Object};
pub use query::{is_numeric, is_uri, tokenize, ObjectPattern, Query, RESERVED_KEYWORDS};
