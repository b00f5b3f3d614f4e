//! Mention label cleaning and the label variants tried by candidate search.

mod stem;

pub use stem::{stem_phrase, stem_word};

use std::path::Path;

use crate::config::{DEFAULT_CORPORATE_AFFIXES, MAX_ACRONYM_LENGTH};

/// Words skipped when deriving an acronym from a label.
const ACRONYM_STOP_WORDS: &[&str] = &["of", "the", "and", "for", "in", "on", "de", "&"];

/// Cleans mention surface strings before they are searched.
#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    /// Lower-cased corporate suffixes with dots removed.
    affixes: Vec<String>,
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self::with_affixes(DEFAULT_CORPORATE_AFFIXES.iter().copied())
    }
}

impl LabelNormalizer {
    pub fn with_affixes<S: AsRef<str>>(affixes: impl IntoIterator<Item = S>) -> Self {
        let mut keys: Vec<String> = affixes
            .into_iter()
            .map(|a| affix_key(a.as_ref()))
            .filter(|a| !a.is_empty())
            .collect();
        keys.sort();
        keys.dedup();
        Self { affixes: keys }
    }

    /// Load suffixes from a file with one entry per line (`#` starts a comment).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::with_affixes(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        ))
    }

    /// Clean a raw mention label.
    ///
    /// Normalizes quotes and whitespace, drops thousands separators, removes
    /// wrapping quotes or brackets and strips trailing corporate suffixes
    /// (`Apple Inc.` becomes `Apple`). Case is preserved.
    pub fn clean(&self, label: &str) -> String {
        let unified: String = label
            .chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' | '`' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                _ => c,
            })
            .collect();

        let numbers = strip_thousands_separators(&unified);
        let trimmed = numbers
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '(' | ')' | '[' | ']' | '{' | '}'))
            .trim();

        let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();
        while tokens.len() > 1 {
            let Some(last) = tokens.last() else { break };
            if self.affixes.binary_search(&affix_key(last)).is_ok() {
                tokens.pop();
            } else {
                break;
            }
        }

        let mut cleaned = tokens.join(" ");
        while cleaned.ends_with(',') {
            cleaned.pop();
        }
        cleaned.trim().to_string()
    }

    /// Comparison form: lower-cased, punctuation as spaces, single-spaced.
    pub fn preprocess(text: &str) -> String {
        text.chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `Obama's` -> `Obama`, `Beatles` -> `Beatle`.
    pub fn strip_possessive(label: &str) -> Option<String> {
        let stripped = if let Some(s) = label.strip_suffix("'s") {
            s
        } else if let Some(s) = label.strip_suffix('s') {
            s
        } else {
            return None;
        };
        let stripped = stripped.trim_end();
        (!stripped.is_empty()).then(|| stripped.to_string())
    }

    /// `NewYork` -> `New York`, `XMLParser` -> `XML Parser`. Single tokens only.
    pub fn split_camel_case(label: &str) -> Option<String> {
        if label.contains(char::is_whitespace) {
            return None;
        }
        let chars: Vec<char> = label.chars().collect();
        let mut out = String::with_capacity(label.len() + 4);
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_lower)
                {
                    out.push(' ');
                }
            }
            out.push(c);
        }
        (out != label).then_some(out)
    }

    pub fn stem(label: &str) -> String {
        stem_phrase(label)
    }

    /// All upper-case and at most four characters: eligible for acronym search.
    pub fn is_acronym(label: &str) -> bool {
        let len = label.chars().count();
        len > 0
            && len <= MAX_ACRONYM_LENGTH
            && label.chars().any(char::is_alphabetic)
            && label == label.to_uppercase()
    }

    /// Initials of the significant words: `Chief Executive Officer` -> `CEO`.
    pub fn acronym_of(label: &str) -> String {
        label
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|w| !w.is_empty() && !ACRONYM_STOP_WORDS.contains(&w.to_lowercase().as_str()))
            .filter_map(|w| w.chars().find(|c| c.is_alphanumeric()))
            .flat_map(char::to_uppercase)
            .collect()
    }
}

fn affix_key(token: &str) -> String {
    token
        .trim_end_matches(',')
        .replace('.', "")
        .to_lowercase()
}

/// `1,000,000` -> `1000000`; commas not between digit groups are kept.
fn strip_thousands_separators(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ',' && i > 0 && chars[i - 1].is_ascii_digit() {
            let group = &chars[i + 1..];
            let digits = group.iter().take_while(|d| d.is_ascii_digit()).count();
            if digits == 3 {
                continue;
            }
        }
        out.push(c);
    }
    out
}
