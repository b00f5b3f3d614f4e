mod common;

use std::io::Write;
use std::sync::Arc;

use common::{res, FlakyStore};
use ned_core::knowledge::vocab::{DBO_PAGE_RANK, RDFS_LABEL};
use ned_core::knowledge::{CachedStore, Fact, KnowledgeError, KnowledgeStore, MemoryStore, Object, Query};
use ned_core::{open_store, Config, NedError};

const SAMPLE: &str = r#"# sample
<http://dbpedia.org/resource/Berlin> <http://www.w3.org/2000/01/rdf-schema#label> "Berlin"@en .
<http://dbpedia.org/resource/Berlin> <http://dbpedia.org/ontology/country> <http://dbpedia.org/resource/Germany> .
<http://dbpedia.org/resource/Berlin> <http://dbpedia.org/ontology/wikiPageRank> "42.5"^^<http://www.w3.org/2001/XMLSchema#double> .

<http://dbpedia.org/resource/Berlin_(band)> <http://www.w3.org/2000/01/rdf-schema#label> "Berlin \"the band\""@en .
"#;

fn sample_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_load_ntriples() {
    let file = sample_file();
    let store = MemoryStore::from_ntriples(file.path()).unwrap();
    assert_eq!(store.len(), 4);

    let facts = store
        .search(&Query::new().subject(res("Berlin_(band)")).predicate(RDFS_LABEL))
        .await
        .unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].object, Object::Literal("Berlin \"the band\"".into()));
}

#[tokio::test]
async fn test_ntriples_parse_error_names_the_line() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "<http://x/a> <http://x/p> <http://x/b> .").unwrap();
    writeln!(file, "this is not a triple").unwrap();

    match MemoryStore::from_ntriples(file.path()) {
        Err(KnowledgeError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = MemoryStore::from_ntriples(dir.path().join("missing.nt"));
    assert!(matches!(result, Err(KnowledgeError::Io { .. })));
}

#[tokio::test]
async fn test_query_contract() {
    let file = sample_file();
    let store = MemoryStore::from_ntriples(file.path()).unwrap();

    let by_uri = store
        .search(&Query::new().object(res("Germany")))
        .await
        .unwrap();
    assert_eq!(by_uri.len(), 1);
    assert_eq!(by_uri[0].subject, res("Berlin"));

    let by_number = store
        .search(&Query::new().predicate(DBO_PAGE_RANK).object("42.50"))
        .await
        .unwrap();
    assert_eq!(by_number.len(), 1);

    let by_terms = store
        .search(&Query::new().predicate(RDFS_LABEL).object("berlin"))
        .await
        .unwrap();
    assert_eq!(by_terms.len(), 2);
    assert_eq!(by_terms[0].subject, res("Berlin"));

    let none = store
        .search(&Query::new().predicate(RDFS_LABEL).object("berlin munich"))
        .await
        .unwrap();
    assert!(none.is_empty());

    let limited = store
        .search(&Query::new().subject(res("Berlin")).limit(1))
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_cached_store_does_not_cache_failures() {
    let flaky = Arc::new(FlakyStore::failing());
    let cached = CachedStore::new(flaky.clone(), 100, None);
    let query = Query::new().object("Berlin");

    assert!(cached.search(&query).await.is_err());
    assert!(cached.search(&query).await.is_err());
    assert_eq!(flaky.calls(), 2);
}

#[tokio::test]
async fn test_cached_store_keys_on_limit() {
    let facts = vec![
        Fact::literal(res("Berlin"), RDFS_LABEL, "Berlin"),
        Fact::literal(res("Berlin_(band)"), RDFS_LABEL, "Berlin"),
    ];
    let counting = Arc::new(FlakyStore::counting(facts));
    let cached = CachedStore::new(counting.clone(), 100, None);

    let one = cached.search(&Query::new().object("Berlin").limit(1)).await.unwrap();
    let all = cached.search(&Query::new().object("Berlin")).await.unwrap();
    cached.search(&Query::new().object("Berlin")).await.unwrap();

    assert_eq!(one.len(), 1);
    assert_eq!(all.len(), 2);
    assert_eq!(counting.calls(), 2);
}

#[tokio::test]
async fn test_open_store_from_path() {
    let file = sample_file();
    let mut config = Config::default();
    config.knowledge_base.store_path = Some(file.path().display().to_string());

    let store = open_store(&config).unwrap();
    let facts = store.search(&Query::new().subject(res("Berlin"))).await.unwrap();
    assert_eq!(facts.len(), 3);

    config.knowledge_base.store_path = Some("/nonexistent/kb.nt".into());
    assert!(matches!(open_store(&config), Err(NedError::Knowledge(_))));
}
