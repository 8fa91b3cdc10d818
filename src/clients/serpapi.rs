use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ProviderError, RawHit, SearchProvider, check_status, into_candidates, require_key};
use crate::domain::{CandidateResult, SearchTerm};
use crate::parser::build_query;

const SERPAPI_API: &str = "https://serpapi.com/search.json";
pub const NAME: &str = "serpapi";

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    max_results: usize,
}

impl SerpApiClient {
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

        debug!(provider = NAME, query, "Querying SerpAPI");

        let num = self.max_results.to_string();
        let response = self
            .client
            .get(SERPAPI_API)
            .query(&[
                ("engine", "google"),
                ("api_key", self.api_key.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(NAME, e))?;

        let body: SerpApiResponse = check_status(NAME, response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(NAME, e))?;

        parse_hits(body)
    }
}

/// SerpAPI reports some failures (bad key, exhausted plan) inside a 200 body,
/// except for the benign "no results" message.
fn parse_hits(body: SerpApiResponse) -> Result<Vec<RawHit>, ProviderError> {
    if let Some(message) = body.error
        && !message.to_lowercase().contains("hasn't returned any results")
    {
        return Err(ProviderError::Malformed {
            provider: NAME,
            message,
        });
    }

    Ok(body
        .organic_results
        .into_iter()
        .filter(|r| !r.link.is_empty())
        .map(|r| RawHit {
            title: r.title,
            url: r.link,
            snippet: r.snippet,
        })
        .collect())
}

#[async_trait::async_trait]
impl SearchProvider for SerpApiClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn search(&self, term: &SearchTerm) -> Result<Vec<CandidateResult>, ProviderError> {
        let hits = self.fetch_hits(&build_query(term.as_str())).await?;
        Ok(into_candidates(hits, self.max_results, term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hits() {
        let body: SerpApiResponse = serde_json::from_value(serde_json::json!({
            "search_metadata": { "status": "Success" },
            "organic_results": [
                {
                    "position": 1,
                    "title": "Goldman Sachs | LinkedIn",
                    "link": "https://www.linkedin.com/company/goldman-sachs/",
                    "snippet": "Leading global investment bank."
                }
            ]
        }))
        .unwrap();

        let hits = parse_hits(body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Goldman Sachs | LinkedIn");
    }

    #[test]
    fn test_parse_hits_empty_result_message_is_not_an_error() {
        let body: SerpApiResponse = serde_json::from_value(serde_json::json!({
            "error": "Google hasn't returned any results for this query."
        }))
        .unwrap();

        assert!(parse_hits(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_hits_error_body() {
        let body: SerpApiResponse = serde_json::from_value(serde_json::json!({
            "error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"
        }))
        .unwrap();

        assert!(matches!(
            parse_hits(body),
            Err(ProviderError::Malformed { provider: "serpapi", .. })
        ));
    }
}
