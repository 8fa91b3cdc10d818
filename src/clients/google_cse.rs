use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ProviderError, RawHit, SearchProvider, check_status, into_candidates, require_key};
use crate::domain::{CandidateResult, SearchTerm};
use crate::parser::build_query;

const GOOGLE_CSE_API: &str = "https://www.googleapis.com/customsearch/v1";
pub const NAME: &str = "google_cse";

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl From<GoogleItem> for RawHit {
    fn from(item: GoogleItem) -> Self {
        Self {
            title: item.title,
            url: item.link,
            snippet: item.snippet,
        }
    }
}

/// Google Programmable Search (Custom Search JSON API).
#[derive(Clone)]
pub struct GoogleCseClient {
    client: Client,
    api_key: String,
    engine_id: String,
    max_results: usize,
}

impl GoogleCseClient {
    #[must_use]
    pub fn with_shared_client(
        client: Client,
        api_key: String,
        engine_id: String,
        max_results: usize,
    ) -> Self {
        Self {
            client,
            api_key,
            engine_id,
            max_results,
        }
    }

    async fn fetch_hits(&self, query: &str) -> Result<Vec<RawHit>, ProviderError> {
        require_key(NAME, &self.api_key)?;
        require_key(NAME, &self.engine_id)?;

        debug!(provider = NAME, query, "Querying Google CSE");

        let num = self.max_results.to_string();
        let response = self
            .client
            .get(GOOGLE_CSE_API)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(NAME, e))?;

        let body: GoogleResponse = check_status(NAME, response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(NAME, e))?;

        Ok(parse_hits(body))
    }
}

fn parse_hits(body: GoogleResponse) -> Vec<RawHit> {
    body.items
        .into_iter()
        .filter(|item| !item.link.is_empty())
        .map(RawHit::from)
        .collect()
}

#[async_trait::async_trait]
impl SearchProvider for GoogleCseClient {
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
        let body: GoogleResponse = serde_json::from_value(serde_json::json!({
            "kind": "customsearch#search",
            "items": [
                {
                    "title": "Microsoft | LinkedIn",
                    "link": "https://www.linkedin.com/company/microsoft/",
                    "snippet": "Microsoft | 24,000,000 followers on LinkedIn."
                },
                { "title": "No link" }
            ]
        }))
        .unwrap();

        let hits = parse_hits(body);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://www.linkedin.com/company/microsoft/");
        assert_eq!(hits[0].title, "Microsoft | LinkedIn");
    }

    #[test]
    fn test_parse_hits_without_items() {
        let body: GoogleResponse =
            serde_json::from_value(serde_json::json!({ "searchInformation": {} })).unwrap();
        assert!(parse_hits(body).is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let client = GoogleCseClient::with_shared_client(
            Client::new(),
            String::new(),
            "cx".to_string(),
            3,
        );
        let term = SearchTerm::parse("microsoft").unwrap();

        let err = client.search(&term).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials { .. }));
    }
}
