use crate::normalize::LabelNormalizer;

/// Maps short mentions to longer labels seen earlier in the same document.
///
/// Mentions must be fed longest first: "Obama" after "Barack Obama" expands
/// to "Barack Obama". A label that neither contains nor is contained in a
/// seen label is registered for later mentions.
#[derive(Debug, Clone, Default)]
pub struct HeuristicExpander {
    /// `(original, preprocessed)` pairs.
    seen: Vec<(String, String)>,
}

impl HeuristicExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(&mut self, label: &str) -> String {
        let key = LabelNormalizer::preprocess(label);
        if key.is_empty() {
            return label.to_string();
        }

        let mut best: Option<&(String, String)> = None;
        let mut related = false;
        for entry in &self.seen {
            let seen = entry.1.as_str();
            if seen == key {
                return label.to_string();
            }
            if contains_words(seen, &key) {
                related = true;
                if best.map_or(true, |b| seen.len() < b.1.len()) {
                    best = Some(entry);
                }
            } else if contains_words(&key, seen) {
                related = true;
            }
        }

        if let Some((original, _)) = best {
            return original.clone();
        }
        if !related {
            self.seen.push((label.to_string(), key));
        }
        label.to_string()
    }
}

/// Whether the words of `needle` appear as a contiguous run in `haystack`.
fn contains_words(haystack: &str, needle: &str) -> bool {
    let hay: Vec<&str> = haystack.split(' ').collect();
    let words: Vec<&str> = needle.split(' ').collect();
    words.len() < hay.len() && hay.windows(words.len()).any(|w| w == words.as_slice())
}
