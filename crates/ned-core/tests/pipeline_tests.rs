mod common;

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use common::{ont, res, store, FailingStore, FlakyStore};
use ned_core::candidates::{CandidateGenerator, DocumentContext, EntityResolver};
use ned_core::config::RankingAlgorithm;
use ned_core::graph::{DisambiguationGraph, GraphExpander};
use ned_core::knowledge::vocab::{NED_CONTEXT, RDF_TYPE};
use ned_core::knowledge::{Fact, KnowledgeStore, MemoryStore, Query};
use ned_core::ranking::ranker_for;
use ned_core::{Config, Disambiguator, Document, DomainWhitelist, Mention, NedError};

const SCENARIO: &str =
    "<entity>Barack Obama</entity> visits <entity>Angela Merkel</entity> in <entity>Berlin</entity>.";

fn disambiguator(config: Config) -> Disambiguator {
    Disambiguator::new(Arc::new(config), store()).unwrap()
}

fn uris(document: &Document) -> Vec<Option<String>> {
    document.mentions.iter().map(|m| m.uri.clone()).collect()
}

#[tokio::test]
async fn test_people_and_places() {
    for algorithm in [RankingAlgorithm::Hits, RankingAlgorithm::PageRank] {
        let mut config = Config::default();
        config.graph.algorithm = algorithm;
        let ned = disambiguator(config);

        let mut document = Document::from_marked_text(SCENARIO).unwrap();
        ned.run(&mut document, false).await.unwrap();

        assert_eq!(
            uris(&document),
            vec![
                Some(res("Barack_Obama")),
                Some(res("Angela_Merkel")),
                Some(res("Berlin")),
            ],
            "{algorithm}"
        );
    }
}

#[tokio::test]
async fn test_resolved_mentions_carry_label_and_types() {
    let ned = disambiguator(Config::default());
    let mut document = Document::from_marked_text(SCENARIO).unwrap();
    ned.run(&mut document, false).await.unwrap();

    let obama = &document.mentions[0];
    assert_eq!(obama.label.as_deref(), Some("Barack Obama"));
    assert_eq!(obama.types, vec![ont("Person"), ont("OfficeHolder")]);
    assert!(obama.score.is_some());

    let berlin = &document.mentions[2];
    assert_eq!(berlin.types, vec![ont("City"), ont("Place")]);
}

#[tokio::test]
async fn test_acronym_mention() {
    let mut config = Config::default();
    config.candidates.acronym = true;
    let ned = disambiguator(config);

    let mut document = Document::from_marked_text("The <entity>CEO</entity> resigned.").unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(document.mentions[0].uri, Some(res("CEO")));

    let ned = disambiguator(Config::default());
    let mut document = Document::from_marked_text("The <entity>CEO</entity> resigned.").unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(document.mentions[0].uri, None);
}

#[tokio::test]
async fn test_camel_case_fallback() {
    let ned = disambiguator(Config::default());
    let mut document = Document::from_marked_text("Flights to <entity>NewYork</entity>").unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(document.mentions[0].uri, Some(res("New_York_City")));
}

#[tokio::test]
async fn test_disambiguation_page_candidates_never_selected() {
    let ned = disambiguator(Config::default());
    let mut document =
        Document::from_marked_text("<entity>Paris</entity> loves <entity>Berlin</entity>").unwrap();

    let dump = ned.run(&mut document, true).await.unwrap().unwrap();

    assert_eq!(document.mentions[0].uri, None);
    assert!(dump.candidates(0).is_empty());
    let paris_hilton = res("Paris_Hilton");
    assert!(document
        .mentions
        .iter()
        .all(|m| m.uri.as_ref() != Some(&paris_hilton)));
}

#[tokio::test]
async fn test_zero_depth_ranks_only_seeds() {
    let mut config = Config::default();
    config.graph.max_depth = 0;
    let store = store();

    let resolver = Arc::new(EntityResolver::new(store.clone(), &config));
    let whitelist = Arc::new(DomainWhitelist::empty(store.clone(), &config.whitelist, 100, None));
    let generator = CandidateGenerator::new(&config, store.clone(), resolver, whitelist).unwrap();

    let document = Document::from_marked_text(SCENARIO).unwrap();
    let mut context = DocumentContext::new(&document);
    let mut graph = DisambiguationGraph::new();
    for mention in &document.mentions {
        generator.generate(mention, &mut graph, &mut context).await.unwrap();
    }
    let seeds: BTreeSet<String> = graph.nodes().map(|(_, n)| n.uri.clone()).collect();

    let stats = GraphExpander::new(
        store,
        config.knowledge_base.edge_type.as_str(),
        config.knowledge_base.node_type.as_str(),
    )
    .expand(&mut graph, config.graph.max_depth)
    .await;
    let table = ranker_for(&config.graph).rank(&mut graph);

    let ranked: BTreeSet<String> = table.uris().map(str::to_string).collect();
    assert_eq!(stats.expanded, 0);
    assert_eq!(ranked, seeds);
    assert_eq!(seeds.len(), 5);
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let ned = disambiguator(Config::default());

    let mut first = Document::from_marked_text(SCENARIO).unwrap();
    let first_dump = ned.run(&mut first, true).await.unwrap();
    let mut second = Document::from_marked_text(SCENARIO).unwrap();
    let second_dump = ned.run(&mut second, true).await.unwrap();

    assert_eq!(first.mentions, second.mentions);
    assert_eq!(first_dump, second_dump);

    let fresh = disambiguator(Config::default());
    let mut third = Document::from_marked_text(SCENARIO).unwrap();
    fresh.run(&mut third, false).await.unwrap();
    assert_eq!(first.mentions, third.mentions);
}

#[tokio::test]
async fn test_redirect_is_followed_once() {
    let ned = disambiguator(Config::default());
    let mut document = Document::from_marked_text("<entity>Merkel</entity> spoke").unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(document.mentions[0].uri, Some(res("Angela_Merkel")));
}

#[tokio::test]
async fn test_candidate_dump_is_ranked() {
    let ned = disambiguator(Config::default());
    let mut document = Document::from_marked_text(SCENARIO).unwrap();
    let dump = ned.run(&mut document, true).await.unwrap().unwrap();

    let berlin: Vec<String> = dump.candidates(37).iter().map(|c| c.uri.clone()).collect();
    assert_eq!(berlin, vec![res("Berlin"), res("Berlin_(band)")]);
    let scores: Vec<f64> = dump.candidates(37).iter().map(|c| c.score).collect();
    assert!(scores[0] >= scores[1]);
    assert_eq!(document.mentions[2].score, Some(scores[0]));
}

#[tokio::test]
async fn test_post_whitelist_overrides_rank() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# bands and people").unwrap();
    writeln!(file, "{}", ont("Band")).unwrap();
    writeln!(file, "{}", ont("Person")).unwrap();

    let mut config = Config::default();
    config.whitelist.post_path = Some(file.path().display().to_string());
    let ned = disambiguator(config);

    let mut document = Document::from_marked_text(SCENARIO).unwrap();
    ned.run(&mut document, false).await.unwrap();

    assert_eq!(document.mentions[1].uri, Some(res("Angela_Merkel")));
    assert_eq!(document.mentions[2].uri, Some(res("Berlin_(band)")));
}

#[tokio::test]
async fn test_pre_whitelist_filters_candidates() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", ont("Person")).unwrap();

    let mut config = Config::default();
    config.whitelist.pre_path = Some(file.path().display().to_string());
    let ned = disambiguator(config);

    let mut document = Document::from_marked_text(SCENARIO).unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(document.mentions[0].uri, Some(res("Barack_Obama")));
    assert_eq!(document.mentions[2].uri, None);

    let mut config = Config::default();
    config.whitelist.pre_path = Some(file.path().display().to_string());
    config.candidates.common_entities = true;
    let ned = disambiguator(config);

    let mut document = Document::from_marked_text(SCENARIO).unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(document.mentions[2].uri, Some(res("Berlin")));
}

#[tokio::test]
async fn test_type_forcing_excludes_incompatible_candidates() {
    let mut config = Config::default();
    config.whitelist.enforce_types = true;
    let ned = disambiguator(config);

    let mut document = Document::new(
        "Barack Obama",
        vec![Mention::new(0, "Barack Obama").with_type("PERSON")],
    );
    let dump = ned.run(&mut document, true).await.unwrap().unwrap();

    let candidates: Vec<String> = dump.candidates(0).iter().map(|c| c.uri.clone()).collect();
    assert_eq!(candidates, vec![res("Barack_Obama")]);
}

#[tokio::test]
async fn test_context_fallback() {
    let context: Arc<dyn KnowledgeStore> = Arc::new(MemoryStore::from_facts(vec![
        Fact::literal(
            res("Angela_Merkel"),
            NED_CONTEXT,
            "Angela Merkel the German chancellor met Barack Obama",
        ),
        Fact::literal(
            res("Barack_Obama"),
            NED_CONTEXT,
            "Barack Obama met Angela Merkel in Berlin",
        ),
    ]));

    let mut config = Config::default();
    config.candidates.context = true;
    config.candidates.surface_forms = false;
    let ned = disambiguator(config).with_context_store(context);

    let mut document = Document::from_marked_text(
        "<entity>Merkel Angela</entity> met <entity>Barack Obama</entity>",
    )
    .unwrap();
    ned.run(&mut document, false).await.unwrap();

    assert_eq!(document.mentions[0].uri, Some(res("Angela_Merkel")));
    assert_eq!(document.mentions[1].uri, Some(res("Barack_Obama")));
}

#[tokio::test]
async fn test_unreachable_store_fails_document() {
    let ned = Disambiguator::new(Arc::new(Config::default()), Arc::new(FlakyStore::failing())).unwrap();
    let mut document = Document::from_marked_text(SCENARIO).unwrap().with_id("doc-1");

    match ned.run(&mut document, false).await {
        Err(NedError::DocumentFailed { document, .. }) => assert_eq!(document, "doc-1"),
        other => panic!("expected DocumentFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_document_without_mentions() {
    let ned = Disambiguator::new(Arc::new(Config::default()), Arc::new(FlakyStore::failing())).unwrap();
    let mut document = Document::from_marked_text("nothing marked here").unwrap();
    assert!(ned.run(&mut document, true).await.unwrap().unwrap().by_offset.is_empty());
}

#[tokio::test]
async fn test_candidate_cache_is_transparent() {
    let store = Arc::new(FlakyStore::counting(common::facts()));
    let ned = Disambiguator::new(Arc::new(Config::default()), store.clone()).unwrap();

    let mut first = Document::from_marked_text(SCENARIO).unwrap();
    ned.run(&mut first, false).await.unwrap();
    let cold = store.calls();

    let mut second = Document::from_marked_text(SCENARIO).unwrap();
    ned.run(&mut second, false).await.unwrap();
    let warm = store.calls() - cold;

    assert_eq!(first.mentions, second.mentions);
    assert!(warm < cold, "warm run made {warm} lookups, cold run {cold}");
    assert!(ned.generator().cache_stats().hits >= 3);
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let mut config = Config::default();
    config.candidates.similarity_metric = "cosine".into();
    assert!(matches!(
        Disambiguator::new(Arc::new(config), store()),
        Err(NedError::ConfigurationInvalid(_))
    ));
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let ned = disambiguator(Config::default());
    let documents = vec![
        Document::from_marked_text("<entity>Berlin</entity>").unwrap().with_id("a"),
        Document::from_marked_text(SCENARIO).unwrap().with_id("b"),
        Document::from_marked_text("<entity>NewYork</entity>").unwrap().with_id("c"),
    ];

    let results = ned.run_batch(documents, 2, false).await;

    let ids: Vec<String> = results
        .iter()
        .map(|r| r.as_ref().unwrap().id.clone())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    let last = results[2].as_ref().unwrap();
    assert_eq!(last.mentions[0].uri, Some(res("New_York_City")));
}

#[tokio::test]
async fn test_failing_mention_does_not_stop_the_others() {
    fn mentions_merkel(query: &Query) -> bool {
        query.object.as_deref().is_some_and(|o| o.contains("Merkel"))
    }
    let store = Arc::new(FailingStore::new(common::facts(), mentions_merkel, usize::MAX));
    let ned = Disambiguator::new(Arc::new(Config::default()), store).unwrap();

    let mut document = Document::from_marked_text(SCENARIO).unwrap();
    ned.run(&mut document, false).await.unwrap();

    assert_eq!(
        uris(&document),
        vec![Some(res("Barack_Obama")), None, Some(res("Berlin"))]
    );
}

#[tokio::test]
async fn test_failed_whitelist_lookup_is_retried() {
    fn type_lookup(query: &Query) -> bool {
        query.predicate.as_deref() == Some(RDF_TYPE)
    }
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", ont("City")).unwrap();

    let mut config = Config::default();
    config.whitelist.pre_path = Some(file.path().display().to_string());
    let store = Arc::new(FailingStore::new(common::facts(), type_lookup, 1));
    let ned = Disambiguator::new(Arc::new(config), store).unwrap();

    let mut document = Document::from_marked_text("<entity>Berlin</entity>").unwrap();
    assert!(matches!(
        ned.run(&mut document, false).await,
        Err(NedError::DocumentFailed { .. })
    ));

    let mut document = Document::from_marked_text("<entity>Berlin</entity>").unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(document.mentions[0].uri, Some(res("Berlin")));
}

#[tokio::test]
async fn test_short_mention_uses_longer_label_from_document() {
    let ned = disambiguator(Config::default());
    let mut document = Document::from_marked_text(
        "<entity>Barack Obama</entity> arrived. <entity>Obama</entity> spoke first.",
    )
    .unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(uris(&document), vec![Some(res("Barack_Obama")), Some(res("Barack_Obama"))]);

    let mut config = Config::default();
    config.candidates.heuristic_expansion = false;
    let ned = disambiguator(config);
    let mut document = Document::from_marked_text("<entity>Obama</entity> spoke.").unwrap();
    ned.run(&mut document, false).await.unwrap();
    assert_eq!(document.mentions[0].uri, None);
}
