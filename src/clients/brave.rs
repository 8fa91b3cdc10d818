use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ProviderError, RawHit, SearchProvider, check_status, into_candidates, require_key};
use crate::domain::{CandidateResult, SearchTerm};
use crate::parser::build_query;

const BRAVE_API: &str = "https://api.search.brave.com/res/v1/web/search";
pub const NAME: &str = "brave";

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

#[derive(Clone)]
pub struct BraveClient {
    client: Client,
    api_key: String,
    max_results: usize,
}

impl BraveClient {
    #[must_use]
    pub fn with_shared_client(client: Client, api_key: String, max_results: usize) -> Self {
        Self {
            client,
            api_key,
            max_results,
        }
    }

    async fn fetch_hits(&self, query: &str) -> Result<Vec<RawHit>, ProviderError> {
        require_key(NAME, &self.api_key)?;

        debug!(provider = NAME, query, "Querying Brave Search");

        let count = self.max_results.to_string();
        let response = self
            .client
            .get(BRAVE_API)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(NAME, e))?;

        let body: BraveResponse = check_status(NAME, response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(NAME, e))?;

        Ok(parse_hits(body))
    }
}

fn parse_hits(body: BraveResponse) -> Vec<RawHit> {
    body.web
        .map(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .filter(|r| !r.url.is_empty())
        .map(|r| RawHit {
            title: r.title,
            url: r.url,
            snippet: r.description,
        })
        .collect()
}

#[async_trait::async_trait]
impl SearchProvider for BraveClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn search(&self, term: &SearchTerm) -> Result<Vec<CandidateResult>, ProviderError> {
        let hits = self.fetch_hits(&build_query(term.as_str())).await?;
        Ok(into_candidates(hits, self.max_results, term))
    }
}
