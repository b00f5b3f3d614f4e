//! Well-known RDF vocabulary used by the pipeline.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const SKOS_ALT_LABEL: &str = "http://www.w3.org/2004/02/skos/core#altLabel";
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";

pub const DBO_REDIRECTS: &str = "http://dbpedia.org/ontology/wikiPageRedirects";
pub const DBO_DISAMBIGUATES: &str = "http://dbpedia.org/ontology/wikiPageDisambiguates";
pub const DBO_ACRONYM: &str = "http://dbpedia.org/ontology/acronym";
pub const DBO_PAGE_RANK: &str = "http://dbpedia.org/ontology/wikiPageRank";

/// Predicate under which the context index stores an entity's context text.
pub const NED_CONTEXT: &str = "http://ned.aksw.org/vocab#context";

/// Type namespaces that are too generic to be useful for domain filtering.
pub const IGNORED_TYPE_MARKERS: &[&str] = &["wordnet", "wikicategory"];

/// Whether a type URI belongs to a namespace ignored by domain filtering.
pub fn is_ignored_type(type_uri: &str) -> bool {
    let lower = type_uri.to_lowercase();
    IGNORED_TYPE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Local name of a resource URI with underscores turned into spaces.
///
/// `http://dbpedia.org/resource/Barack_Obama` becomes `Barack Obama`.
pub fn local_name(uri: &str) -> String {
    let tail = uri
        .rsplit(|c| c == '/' || c == '#')
        .next()
        .unwrap_or(uri);
    tail.replace('_', " ")
}
