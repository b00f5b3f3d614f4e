//! DBpedia-style fixture knowledge base shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ned_core::knowledge::vocab::{
    DBO_ACRONYM, DBO_DISAMBIGUATES, DBO_REDIRECTS, RDFS_LABEL, RDF_TYPE,
};
use ned_core::knowledge::{Fact, KnowledgeError, KnowledgeStore, MemoryStore, Query};

pub const R: &str = "http://dbpedia.org/resource/";
pub const O: &str = "http://dbpedia.org/ontology/";

pub fn res(name: &str) -> String {
    format!("{R}{name}")
}

pub fn ont(name: &str) -> String {
    format!("{O}{name}")
}

pub fn facts() -> Vec<Fact> {
    vec![
        // people
        Fact::literal(res("Barack_Obama"), RDFS_LABEL, "Barack Obama"),
        Fact::uri(res("Barack_Obama"), RDF_TYPE, ont("Person")),
        Fact::uri(res("Barack_Obama"), RDF_TYPE, ont("OfficeHolder")),
        Fact::uri(res("Barack_Obama"), RDF_TYPE, "http://www.w3.org/2002/07/owl#Thing"),
        Fact::uri(res("Barack_Obama"), ont("residence"), res("Washington,_D.C.")),
        Fact::uri(res("Barack_Obama"), ont("visited"), res("Berlin")),
        Fact::literal(res("Barack_Obama_(play)"), RDFS_LABEL, "Barack Obama"),
        Fact::uri(res("Barack_Obama_(play)"), RDF_TYPE, ont("Work")),
        Fact::literal(res("Angela_Merkel"), RDFS_LABEL, "Angela Merkel"),
        Fact::uri(res("Angela_Merkel"), RDF_TYPE, ont("Person")),
        Fact::uri(res("Angela_Merkel"), ont("residence"), res("Berlin")),
        Fact::uri(res("Angela_Merkel"), ont("knows"), res("Barack_Obama")),
        Fact::literal(res("Merkel"), RDFS_LABEL, "Merkel"),
        Fact::uri(res("Merkel"), DBO_REDIRECTS, res("Angela_Merkel")),
        // places
        Fact::literal(res("Berlin"), RDFS_LABEL, "Berlin"),
        Fact::uri(res("Berlin"), RDF_TYPE, ont("City")),
        Fact::uri(res("Berlin"), RDF_TYPE, ont("Place")),
        Fact::uri(res("Berlin"), ont("country"), res("Germany")),
        Fact::literal(res("Berlin_(band)"), RDFS_LABEL, "Berlin"),
        Fact::uri(res("Berlin_(band)"), RDF_TYPE, ont("Band")),
        Fact::uri(res("Berlin_(band)"), ont("genre"), res("New_wave_music")),
        Fact::literal(res("Washington,_D.C."), RDFS_LABEL, "Washington, D.C."),
        Fact::literal(res("New_York_City"), RDFS_LABEL, "New York"),
        Fact::uri(res("New_York_City"), RDF_TYPE, ont("City")),
        // acronyms
        Fact::literal(res("CEO"), DBO_ACRONYM, "CEO"),
        Fact::literal(res("CEO"), RDFS_LABEL, "Chief Executive Officer"),
        Fact::literal(res("Central_European_Orchestra"), DBO_ACRONYM, "CEO"),
        Fact::literal(res("Central_European_Orchestra"), RDFS_LABEL, "Wiener Kammerorchester"),
        // disambiguation pages
        Fact::literal(res("Paris_(disambiguation)"), RDFS_LABEL, "Paris"),
        Fact::uri(res("Paris_(disambiguation)"), DBO_DISAMBIGUATES, res("Paris_Hilton")),
        Fact::uri(res("Paris_(disambiguation)"), ont("wikiPageWikiLink"), res("Paris_Hilton")),
        Fact::literal(res("Paris_Hilton"), "http://xmlns.com/foaf/0.1/nick", "Paris"),
        Fact::uri(res("Berlin"), ont("twinTown"), res("Paris_Hilton")),
    ]
}

pub fn store() -> Arc<dyn KnowledgeStore> {
    Arc::new(MemoryStore::from_facts(facts()))
}

/// Counts queries and fails every one of them once `fail` is set.
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FlakyStore {
    pub fn failing() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn counting(facts: Vec<Fact>) -> Self {
        Self {
            inner: MemoryStore::from_facts(facts),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeStore for FlakyStore {
    async fn search(&self, query: &Query) -> Result<Vec<Fact>, KnowledgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(KnowledgeError::LookupFailed {
                query: query.to_string(),
                message: "index unavailable".into(),
            });
        }
        self.inner.search(query).await
    }
}

/// Fails queries selected by `rule`, at most `failures` times.
pub struct FailingStore {
    inner: MemoryStore,
    rule: fn(&Query) -> bool,
    failures: AtomicUsize,
}

impl FailingStore {
    pub fn new(facts: Vec<Fact>, rule: fn(&Query) -> bool, failures: usize) -> Self {
        Self {
            inner: MemoryStore::from_facts(facts),
            rule,
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl KnowledgeStore for FailingStore {
    async fn search(&self, query: &Query) -> Result<Vec<Fact>, KnowledgeError> {
        let fail = (self.rule)(query)
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        if fail {
            return Err(KnowledgeError::LookupFailed {
                query: query.to_string(),
                message: "shard unavailable".into(),
            });
        }
        self.inner.search(query).await
    }
}
