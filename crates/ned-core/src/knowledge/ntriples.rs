//! Minimal N-Triples reader for loading fixture knowledge bases.

use regex::Regex;

use super::error::KnowledgeError;
use super::models::{Fact, Object};

/// `<s> <p> <o> .` or `<s> <p> "literal"(@lang|^^<type>)? .`
const TRIPLE_PATTERN: &str = r#"^<([^>]*)>\s+<([^>]*)>\s+(?:<([^>]*)>|"((?:[^"\\]|\\.)*)"(?:@[A-Za-z][A-Za-z0-9\-]*|\^\^<[^>]*>)?)\s*\.\s*$"#;

/// Parse N-Triples content. `source` names the input in error messages.
pub fn parse(content: &str, source: &str) -> Result<Vec<Fact>, KnowledgeError> {
    let re = Regex::new(TRIPLE_PATTERN).map_err(|e| KnowledgeError::Parse {
        path: source.to_string(),
        line: 0,
        message: e.to_string(),
    })?;

    let mut facts = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let caps = re.captures(line).ok_or_else(|| KnowledgeError::Parse {
            path: source.to_string(),
            line: index + 1,
            message: format!("not a triple: {line}"),
        })?;

        let subject = caps[1].to_string();
        let predicate = caps[2].to_string();
        let object = match (caps.get(3), caps.get(4)) {
            (Some(uri), _) => Object::Uri(uri.as_str().to_string()),
            (None, Some(literal)) => Object::Literal(unescape(literal.as_str())),
            (None, None) => Object::Literal(String::new()),
        };

        facts.push(Fact {
            subject,
            predicate,
            object,
        });
    }

    Ok(facts)
}

fn unescape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
