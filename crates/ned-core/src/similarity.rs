//! String similarity metrics used to prune candidates.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// A normalized similarity in `[0, 1]`, where 1 means identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    /// Sørensen–Dice over character bigrams.
    NGram,
    Levenshtein,
    Damerau,
    JaroWinkler,
}

impl SimilarityMetric {
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        match self {
            Self::NGram => strsim::sorensen_dice(a, b),
            Self::Levenshtein => strsim::normalized_levenshtein(a, b),
            Self::Damerau => strsim::normalized_damerau_levenshtein(a, b),
            Self::JaroWinkler => strsim::jaro_winkler(a, b),
        }
    }
}

impl FromStr for SimilarityMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ngram" | "bigram" | "dice" => Ok(Self::NGram),
            "levenshtein" => Ok(Self::Levenshtein),
            "damerau" | "damerau_levenshtein" => Ok(Self::Damerau),
            "jaro_winkler" | "jarowinkler" => Ok(Self::JaroWinkler),
            other => Err(ConfigError::Invalid(format!(
                "unknown similarity metric '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NGram => "ngram",
            Self::Levenshtein => "levenshtein",
            Self::Damerau => "damerau",
            Self::JaroWinkler => "jaro_winkler",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        for metric in [
            SimilarityMetric::NGram,
            SimilarityMetric::Levenshtein,
            SimilarityMetric::Damerau,
            SimilarityMetric::JaroWinkler,
        ] {
            assert!((metric.similarity("berlin", "berlin") - 1.0).abs() < 1e-9, "{metric}");
        }
    }

    #[test]
    fn test_unknown_metric() {
        assert!("cosine".parse::<SimilarityMetric>().is_err());
        assert_eq!("Bigram".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::NGram);
        assert!("trigram".parse::<SimilarityMetric>().is_err());
    }
}
