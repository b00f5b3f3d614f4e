use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::error::KnowledgeError;
use super::models::{Fact, Query};
use super::KnowledgeStore;

/// Client for a remote triple index.
///
/// Speaks a small JSON protocol:
///
/// ```text
/// GET {base_url}/search?s=<uri>&p=<uri>&o=<text>&limit=<n>
/// 200 {"facts": [{"subject": "...", "predicate": "...",
///                 "object": {"kind": "uri"|"literal", "value": "..."}}]}
/// ```
///
/// Unset positions are omitted from the query string.
pub struct HttpStore {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    facts: Vec<Fact>,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    fn query_params(query: &Query) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(s) = &query.subject {
            params.push(("s", s.clone()));
        }
        if let Some(p) = &query.predicate {
            params.push(("p", p.clone()));
        }
        if let Some(o) = &query.object {
            params.push(("o", o.clone()));
        }
        params.push(("limit", query.limit.to_string()));
        params
    }
}

#[async_trait]
impl KnowledgeStore for HttpStore {
    async fn search(&self, query: &Query) -> Result<Vec<Fact>, KnowledgeError> {
        let response = self
            .client
            .get(self.search_url())
            .query(&Self::query_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(KnowledgeError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| KnowledgeError::LookupFailed {
                    query: query.to_string(),
                    message: e.to_string(),
                })?;

        let mut facts = body.facts;
        facts.truncate(query.limit);
        Ok(facts)
    }
}
