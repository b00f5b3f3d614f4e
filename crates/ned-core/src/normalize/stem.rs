//! Light suffix-stripping stemmer for the last-resort label search.
//!
//! Only the inflectional suffixes that commonly separate a mention from an
//! entity label are removed (plurals, past tense, gerunds) plus a handful of
//! derivational endings. Tokens shorter than four characters are left alone.

const DERIVATIONAL: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("ization", "ize"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("iveness", "ive"),
    ("tional", "tion"),
];

/// Stem every whitespace-separated token of `phrase`.
pub fn stem_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(stem_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stem a single token, preserving the case of the kept prefix.
pub fn stem_word(word: &str) -> String {
    if word.chars().count() < 4 || !word.chars().all(char::is_alphabetic) {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if lower.len() != word.len() {
        // Case mapping changed byte lengths; slicing by the lower-case suffix would be unsafe.
        return word.to_string();
    }

    for (suffix, replacement) in DERIVATIONAL {
        if let Some(stem) = lower.strip_suffix(suffix) {
            if has_vowel(stem) {
                return format!("{}{}", &word[..stem.len()], replacement);
            }
        }
    }

    if lower.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        return format!("{}y", &word[..stem.len()]);
    }
    if lower.ends_with("eed") {
        return word[..word.len() - 1].to_string();
    }
    for suffix in ["ing", "ed"] {
        if let Some(stem) = lower.strip_suffix(suffix) {
            if stem.len() >= 3 && has_vowel(stem) {
                return undouble(&word[..stem.len()]);
            }
        }
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
}

/// `stopp` -> `stop`, but `fall` and `buzz` keep their double letter.
fn undouble(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    if let [.., a, b] = chars.as_slice() {
        if a == b && !matches!(b.to_ascii_lowercase(), 'l' | 's' | 'z') {
            return chars[..chars.len() - 1].iter().collect();
        }
    }
    stem.to_string()
}
