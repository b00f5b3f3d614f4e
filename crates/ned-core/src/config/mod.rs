//! Configuration management for ned.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `ned.toml` file
//! 3. User config `~/.config/ned/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! A loaded [`Config`] is immutable for the lifetime of the process and is
//! shared by every component through an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::similarity::SimilarityMetric;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Knowledge base vocabulary and location.
    pub knowledge_base: KnowledgeBaseConfig,

    /// Candidate generation.
    pub candidates: CandidateConfig,

    /// Graph expansion and ranking.
    pub graph: GraphConfig,

    /// Domain whitelists and type forcing.
    pub whitelist: WhitelistConfig,

    /// Cache sizes.
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./ned.toml` (project local)
    /// 2. `~/.config/ned/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(DEFAULT_CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("NED_ENDPOINT") {
            self.knowledge_base.endpoint = Some(endpoint);
        }
        if let Ok(path) = std::env::var("NED_STORE_PATH") {
            self.knowledge_base.store_path = Some(path);
        }
        if let Ok(metric) = std::env::var("NED_SIMILARITY_METRIC") {
            self.candidates.similarity_metric = metric;
        }
        if let Ok(threshold) = std::env::var("NED_SIMILARITY_THRESHOLD") {
            if let Ok(n) = threshold.parse() {
                self.candidates.similarity_threshold = n;
            }
        }
        if let Ok(depth) = std::env::var("NED_MAX_DEPTH") {
            if let Ok(n) = depth.parse() {
                self.graph.max_depth = n;
            }
        }
        if let Ok(algorithm) = std::env::var("NED_ALGORITHM") {
            if let Ok(a) = algorithm.parse() {
                self.graph.algorithm = a;
            }
        }
    }

    /// Check values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        SimilarityMetric::from_str(&self.candidates.similarity_metric)?;

        let threshold = self.candidates.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "similarity_threshold must be within [0, 1], got {threshold}"
            )));
        }

        let damping = self.graph.damping;
        if !(0.0..1.0).contains(&damping) {
            return Err(ConfigError::Invalid(format!(
                "damping must be within [0, 1), got {damping}"
            )));
        }

        if self.knowledge_base.node_type.is_empty() {
            return Err(ConfigError::Invalid("knowledge_base.node_type is empty".into()));
        }
        if self.knowledge_base.label_predicate.is_empty() {
            return Err(ConfigError::Invalid(
                "knowledge_base.label_predicate is empty".into(),
            ));
        }

        Ok(())
    }

    /// Render this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        Config::default().to_toml().unwrap_or_default()
    }
}

/// Knowledge base vocabulary and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    /// Base URI of entity resources.
    pub base_uri: String,

    /// Prefix of resources that may become graph nodes.
    pub node_type: String,

    /// Prefix of predicates followed during expansion.
    pub edge_type: String,

    /// Prefix of types reported for resolved mentions.
    pub type_prefix: String,

    pub label_predicate: String,
    pub alt_label_predicate: String,
    pub redirect_predicate: String,
    pub disambiguates_predicate: String,
    pub acronym_predicate: String,
    pub popularity_predicate: String,
    pub context_predicate: String,

    /// N-Triples file loaded into an in-memory store.
    pub store_path: Option<String>,

    /// Base URL of a remote triple index (takes precedence over `store_path`).
    pub endpoint: Option<String>,

    /// N-Triples file with the context index.
    pub context_store_path: Option<String>,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            node_type: DEFAULT_NODE_TYPE.to_string(),
            edge_type: DEFAULT_EDGE_TYPE.to_string(),
            type_prefix: DEFAULT_TYPE_PREFIX.to_string(),
            label_predicate: DEFAULT_LABEL_PREDICATE.to_string(),
            alt_label_predicate: DEFAULT_ALT_LABEL_PREDICATE.to_string(),
            redirect_predicate: DEFAULT_REDIRECT_PREDICATE.to_string(),
            disambiguates_predicate: DEFAULT_DISAMBIGUATES_PREDICATE.to_string(),
            acronym_predicate: DEFAULT_ACRONYM_PREDICATE.to_string(),
            popularity_predicate: DEFAULT_POPULARITY_PREDICATE.to_string(),
            context_predicate: DEFAULT_CONTEXT_PREDICATE.to_string(),
            store_path: None,
            endpoint: None,
            context_store_path: None,
        }
    }
}

/// Candidate generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Raw hits fetched per label search.
    pub max_candidate_lookups: usize,

    /// Acronym hits considered.
    pub max_acronym_lookups: usize,

    /// Context hits checked for mutual connections.
    pub max_connection_lookups: usize,

    /// One of `ngram` (bigram Dice, alias `bigram`), `levenshtein`, `damerau`, `jaro_winkler`.
    pub similarity_metric: String,

    /// Minimum similarity for alternate-label and acronym matches.
    pub similarity_threshold: f64,

    /// Expand short labels to longer labels seen earlier in the document.
    pub heuristic_expansion: bool,

    /// Try the acronym index for short upper-case labels.
    pub acronym: bool,

    /// Fall back to the context index.
    pub context: bool,

    /// Skip the pre-disambiguation whitelist.
    pub common_entities: bool,

    /// Re-rank label hits by stored popularity.
    pub popularity: bool,

    /// Retry against alternate labels when primary labels find nothing.
    pub surface_forms: bool,

    /// File with one corporate suffix per line.
    pub corporate_affixes_path: Option<String>,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            max_candidate_lookups: DEFAULT_MAX_CANDIDATE_LOOKUPS,
            max_acronym_lookups: DEFAULT_MAX_ACRONYM_LOOKUPS,
            max_connection_lookups: DEFAULT_MAX_CONNECTION_LOOKUPS,
            similarity_metric: DEFAULT_SIMILARITY_METRIC.to_string(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            heuristic_expansion: true,
            acronym: false,
            context: false,
            common_entities: false,
            popularity: false,
            surface_forms: true,
            corporate_affixes_path: None,
        }
    }
}

/// Link analysis algorithm used to rank the candidate graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingAlgorithm {
    #[default]
    Hits,
    PageRank,
}

impl FromStr for RankingAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hits" => Ok(Self::Hits),
            "pagerank" | "page_rank" => Ok(Self::PageRank),
            other => Err(ConfigError::Invalid(format!(
                "unknown ranking algorithm '{other}'"
            ))),
        }
    }
}

impl fmt::Display for RankingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hits => write!(f, "hits"),
            Self::PageRank => write!(f, "pagerank"),
        }
    }
}

/// Graph expansion and ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// BFS depth of expansion; 0 disables expansion.
    pub max_depth: usize,

    /// Outgoing facts fetched per expanded node.
    pub expansion_limit: usize,

    pub algorithm: RankingAlgorithm,

    /// PageRank random-jump probability.
    pub damping: f64,

    pub hits_iterations: usize,
    pub pagerank_iterations: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
            algorithm: RankingAlgorithm::default(),
            damping: DEFAULT_DAMPING,
            hits_iterations: DEFAULT_HITS_ITERATIONS,
            pagerank_iterations: DEFAULT_PAGERANK_ITERATIONS,
        }
    }
}

/// Domain whitelist configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitelistConfig {
    /// Whitelist applied while generating candidates.
    pub pre_path: Option<String>,

    /// Whitelist applied when picking the winner.
    pub post_path: Option<String>,

    /// Require candidate types to agree with the mention's NER type.
    pub enforce_types: bool,

    /// `rdf:type` facts fetched per check.
    pub type_lookup_limit: usize,

    /// NER type to accepted knowledge-base types.
    pub type_mapping: BTreeMap<String, Vec<String>>,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            pre_path: None,
            post_path: None,
            enforce_types: false,
            type_lookup_limit: DEFAULT_TYPE_LOOKUP_LIMIT,
            type_mapping: DEFAULT_TYPE_MAPPING
                .iter()
                .map(|(ner, types)| {
                    (
                        ner.to_string(),
                        types.iter().map(|t| t.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// Cache capacities (entries) and optional time-to-live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub candidates: u64,
    pub whitelist: u64,
    pub disambiguation_pages: u64,
    pub triples: u64,

    /// Seconds before an entry expires; unset means entries live until evicted.
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATE_CACHE_SIZE,
            whitelist: DEFAULT_WHITELIST_CACHE_SIZE,
            disambiguation_pages: DEFAULT_DISAMBIGUATION_CACHE_SIZE,
            triples: DEFAULT_TRIPLE_CACHE_SIZE,
            ttl_secs: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.graph.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.graph.algorithm, RankingAlgorithm::Hits);
        assert_eq!(config.knowledge_base.node_type, DEFAULT_NODE_TYPE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[knowledge_base]"));
        assert!(toml_str.contains("[candidates]"));
        assert!(toml_str.contains("[graph]"));
        assert!(toml_str.contains("algorithm = \"hits\""));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("PageRank".parse::<RankingAlgorithm>().unwrap(), RankingAlgorithm::PageRank);
        assert!("bfs".parse::<RankingAlgorithm>().is_err());
    }

    #[test]
    fn test_invalid_damping() {
        let mut config = Config::default();
        config.graph.damping = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
