//! Default values for ned configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

use crate::knowledge::vocab;

// ============================================================================
// Knowledge Base Defaults
// ============================================================================

/// Base URI of entity resources.
pub const DEFAULT_BASE_URI: &str = "http://dbpedia.org/resource/";

/// Only resources under this prefix are graph nodes.
pub const DEFAULT_NODE_TYPE: &str = "http://dbpedia.org/resource/";

/// Only predicates under this prefix are followed during graph expansion.
pub const DEFAULT_EDGE_TYPE: &str = "http://dbpedia.org/ontology/";

/// Only types under this prefix are reported for resolved mentions.
pub const DEFAULT_TYPE_PREFIX: &str = "http://dbpedia.org/ontology/";

pub const DEFAULT_LABEL_PREDICATE: &str = vocab::RDFS_LABEL;
pub const DEFAULT_ALT_LABEL_PREDICATE: &str = vocab::SKOS_ALT_LABEL;
pub const DEFAULT_REDIRECT_PREDICATE: &str = vocab::DBO_REDIRECTS;
pub const DEFAULT_DISAMBIGUATES_PREDICATE: &str = vocab::DBO_DISAMBIGUATES;
pub const DEFAULT_ACRONYM_PREDICATE: &str = vocab::DBO_ACRONYM;
pub const DEFAULT_POPULARITY_PREDICATE: &str = vocab::DBO_PAGE_RANK;
pub const DEFAULT_CONTEXT_PREDICATE: &str = vocab::NED_CONTEXT;

/// Default result cap of a store query.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

// ============================================================================
// Candidate Generation Defaults
// ============================================================================

/// Maximum raw hits fetched per label search.
pub const DEFAULT_MAX_CANDIDATE_LOOKUPS: usize = 100;

/// Maximum acronym hits considered.
pub const DEFAULT_MAX_ACRONYM_LOOKUPS: usize = 5;

/// Maximum context hits checked for mutual connections.
pub const DEFAULT_MAX_CONNECTION_LOOKUPS: usize = 10;

/// Number of top hits re-scored by popularity.
pub const DEFAULT_POPULARITY_WINDOW: usize = 100;

/// Default similarity metric name: Sørensen–Dice over character bigrams.
pub const DEFAULT_SIMILARITY_METRIC: &str = "ngram";

/// Minimum similarity for alternate-label and acronym matches.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.87;

/// Acronym path applies to all-uppercase labels up to this length.
pub const MAX_ACRONYM_LENGTH: usize = 4;

/// Corporate suffixes stripped from mention labels.
pub const DEFAULT_CORPORATE_AFFIXES: &[&str] = &[
    "Inc", "Incorporated", "Corp", "Corporation", "Co", "Company", "Ltd", "Limited", "LLC",
    "LLP", "PLC", "GmbH", "AG", "SA", "S.A", "NV", "N.V", "BV", "B.V", "SE", "SpA", "Pty",
    "Holdings", "Group",
];

// ============================================================================
// Graph Defaults
// ============================================================================

/// BFS depth of graph expansion.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Outgoing facts fetched per expanded node.
pub const DEFAULT_EXPANSION_LIMIT: usize = 100;

/// HITS iteration budget.
pub const DEFAULT_HITS_ITERATIONS: usize = 20;

/// PageRank iteration budget.
pub const DEFAULT_PAGERANK_ITERATIONS: usize = 50;

/// PageRank random-jump probability.
pub const DEFAULT_DAMPING: f64 = 0.1;

// ============================================================================
// Whitelist Defaults
// ============================================================================

/// `rdf:type` facts fetched when checking a URI against the whitelist.
pub const DEFAULT_TYPE_LOOKUP_LIMIT: usize = 20;

/// Default NER type to knowledge-base type mapping.
pub const DEFAULT_TYPE_MAPPING: &[(&str, &[&str])] = &[
    (
        "PERSON",
        &["http://dbpedia.org/ontology/Person", "http://xmlns.com/foaf/0.1/Person"],
    ),
    (
        "ORGANIZATION",
        &["http://dbpedia.org/ontology/Organisation"],
    ),
    ("ORG", &["http://dbpedia.org/ontology/Organisation"]),
    (
        "LOCATION",
        &["http://dbpedia.org/ontology/Place", "http://dbpedia.org/ontology/Location"],
    ),
    ("PLACE", &["http://dbpedia.org/ontology/Place"]),
];

// ============================================================================
// Cache Defaults
// ============================================================================

pub const DEFAULT_CANDIDATE_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_WHITELIST_CACHE_SIZE: u64 = 50_000;
pub const DEFAULT_DISAMBIGUATION_CACHE_SIZE: u64 = 50_000;
pub const DEFAULT_TRIPLE_CACHE_SIZE: u64 = 100_000;

// ============================================================================
// Config Files
// ============================================================================

/// Project-local config file name.
pub const DEFAULT_CONFIG_FILE: &str = "ned.toml";

/// Directory under the user config dir.
pub const DEFAULT_CONFIG_DIR: &str = "ned";
