//! Documents, mentions and the pipeline's output views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NedError;

const OPEN_TAG: &str = "<entity>";
const CLOSE_TAG: &str = "</entity>";

/// A marked span of the document text and, after a run, its resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Character offset of the span in the document text.
    pub offset: usize,
    /// Length of the span in characters.
    #[serde(default)]
    pub length: usize,
    pub surface: String,

    /// NER type supplied with the mention (`PERSON`, `ORG`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mention_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Canonical label of the resolved entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Mention {
    pub fn new(offset: usize, surface: impl Into<String>) -> Self {
        let surface = surface.into();
        Self {
            offset,
            length: surface.chars().count(),
            surface,
            mention_type: None,
            uri: None,
            label: None,
            types: Vec::new(),
            score: None,
        }
    }

    pub fn with_type(mut self, mention_type: impl Into<String>) -> Self {
        self.mention_type = Some(mention_type.into());
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.uri.is_some()
    }

    /// Forget any previous resolution.
    pub(crate) fn clear_resolution(&mut self) {
        self.uri = None;
        self.label = None;
        self.types.clear();
        self.score = None;
    }
}

/// A text with its mentions, disambiguated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub mentions: Vec<Mention>,
}

impl Document {
    /// A document with pre-computed mention spans and a fresh id.
    pub fn new(text: impl Into<String>, mentions: Vec<Mention>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            mentions,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Parse `<entity>...</entity>` markup.
    ///
    /// Tags are removed from the text; mention offsets count characters of
    /// the stripped text. Nested, unclosed or empty spans are rejected.
    pub fn from_marked_text(marked: &str) -> Result<Self, NedError> {
        let mut text = String::with_capacity(marked.len());
        let mut chars = 0usize;
        let mut mentions = Vec::new();
        let mut rest = marked;

        while let Some(start) = rest.find(OPEN_TAG) {
            let before = &rest[..start];
            if before.contains(CLOSE_TAG) {
                return Err(NedError::Markup(format!(
                    "unexpected {CLOSE_TAG} at character {chars}"
                )));
            }
            text.push_str(before);
            chars += before.chars().count();

            let inner_start = &rest[start + OPEN_TAG.len()..];
            let end = inner_start.find(CLOSE_TAG).ok_or_else(|| {
                NedError::Markup(format!("unclosed {OPEN_TAG} at character {chars}"))
            })?;
            let surface = &inner_start[..end];
            if surface.contains(OPEN_TAG) {
                return Err(NedError::Markup(format!(
                    "nested {OPEN_TAG} at character {chars}"
                )));
            }
            if surface.trim().is_empty() {
                return Err(NedError::Markup(format!("empty entity at character {chars}")));
            }

            mentions.push(Mention::new(chars, surface));
            text.push_str(surface);
            chars += surface.chars().count();
            rest = &inner_start[end + CLOSE_TAG.len()..];
        }

        if rest.contains(CLOSE_TAG) {
            return Err(NedError::Markup(format!(
                "unexpected {CLOSE_TAG} at character {chars}"
            )));
        }
        text.push_str(rest);

        Ok(Self::new(text, mentions))
    }

    /// Output view of the document, with an optional candidate dump.
    pub fn result(&self, candidates: Option<CandidateDump>) -> DocumentResult {
        DocumentResult {
            id: self.id.clone(),
            mentions: self.mentions.clone(),
            candidates,
        }
    }
}

/// One line of batch input: marked text, or plain text with explicit mentions.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub mentions: Option<Vec<Mention>>,
}

impl DocumentInput {
    pub fn into_document(self) -> Result<Document, NedError> {
        let document = match self.mentions {
            Some(mut mentions) => {
                for mention in &mut mentions {
                    if mention.length == 0 {
                        mention.length = mention.surface.chars().count();
                    }
                    mention.clear_resolution();
                }
                Document::new(self.text, mentions)
            }
            None => Document::from_marked_text(&self.text)?,
        };
        Ok(match self.id {
            Some(id) => document.with_id(id),
            None => document,
        })
    }
}

/// A candidate with its ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub uri: String,
    pub score: f64,
}

/// Every ranked candidate per mention offset, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateDump {
    pub by_offset: BTreeMap<usize, Vec<ScoredCandidate>>,
}

impl CandidateDump {
    pub fn candidates(&self, offset: usize) -> &[ScoredCandidate] {
        self.by_offset.get(&offset).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Serializable outcome of disambiguating one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub id: String,
    pub mentions: Vec<Mention>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<CandidateDump>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marked_text_offsets() {
        let doc = Document::from_marked_text(
            "<entity>Barack Obama</entity> met <entity>Angela Merkel</entity> in <entity>Berlin</entity>.",
        )
        .unwrap();

        assert_eq!(doc.text, "Barack Obama met Angela Merkel in Berlin.");
        let spans: Vec<(usize, usize, &str)> = doc
            .mentions
            .iter()
            .map(|m| (m.offset, m.length, m.surface.as_str()))
            .collect();
        assert_eq!(
            spans,
            vec![(0, 12, "Barack Obama"), (17, 13, "Angela Merkel"), (34, 6, "Berlin")]
        );
        assert!(Uuid::parse_str(&doc.id).is_ok());
    }

    #[test]
    fn test_offsets_count_characters() {
        let doc = Document::from_marked_text("Über <entity>München</entity>").unwrap();
        assert_eq!(doc.mentions[0].offset, 5);
        assert_eq!(doc.mentions[0].length, 7);
    }

    #[test]
    fn test_malformed_markup() {
        for bad in [
            "<entity>Berlin",
            "Berlin</entity>",
            "<entity><entity>Berlin</entity></entity>",
            "<entity> </entity>",
        ] {
            assert!(
                matches!(Document::from_marked_text(bad), Err(NedError::Markup(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_input_with_explicit_mentions() {
        let input: DocumentInput = serde_json::from_str(
            r#"{"id":"d1","text":"Obama visited Berlin","mentions":[{"offset":0,"surface":"Obama","type":"PERSON"}]}"#,
        )
        .unwrap();
        let doc = input.into_document().unwrap();

        assert_eq!(doc.id, "d1");
        assert_eq!(doc.mentions[0].length, 5);
        assert_eq!(doc.mentions[0].mention_type.as_deref(), Some("PERSON"));
    }

    #[test]
    fn test_unresolved_mentions_serialize_compactly() {
        let doc = Document::new("Berlin", vec![Mention::new(0, "Berlin")]).with_id("d");
        let json = serde_json::to_value(doc.result(None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "d", "mentions": [{"offset": 0, "length": 6, "surface": "Berlin"}]})
        );
    }
}
