//! Web search via the Serper (Google) search API
//!
//! A timed-out search degrades to an empty result set. Every other failure
//! (bad status, DNS, connection refused, malformed body) is returned as an error.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::{Error, Result};

/// Runs a search query and returns organic results
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search for `query`; the query is sent verbatim
    ///
    /// # Errors
    ///
    /// Returns error on any non-timeout failure
    async fn search(&self, query: &str) -> Result<SearchResponse>;
}

/// Parsed search response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Organic (non-advertisement) hits in rank order
    #[serde(default)]
    pub organic: Vec<SearchResult>,
}

impl SearchResponse {
    /// Empty response, used when the search times out
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            organic: Vec::new(),
        }
    }

    /// Whether there are no organic hits
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.organic.is_empty()
    }
}

/// Single organic search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title
    #[serde(default)]
    pub title: String,
    /// Result URL
    pub link: String,
    /// Result snippet
    #[serde(default)]
    pub snippet: String,
}

/// Serper API request body
#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

/// Serper search client
pub struct SerperClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    num_results: usize,
}

impl SerperClient {
    /// Create a client from search configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            num_results: config.num_results,
        })
    }
}

#[async_trait]
impl SearchBackend for SerperClient {
    async fn search(&self, query: &str) -> Result<SearchResponse> {
        let request_body = SerperRequest {
            q: query,
            num: self.num_results,
        };

        tracing::debug!(query, num = self.num_results, "searching");

        let sent = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await;

        let body = match sent.and_then(reqwest::Response::error_for_status) {
            Ok(response) => response.text().await,
            Err(e) => Err(e),
        };

        let body = match body {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                tracing::warn!(query, "search timed out, treating as no results");
                return Ok(SearchResponse::empty());
            }
            Err(e) => return Err(Error::SearchTransport(e)),
        };

        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|e| Error::SearchDecode(e.to_string()))?;

        tracing::debug!(query, hits = response.organic.len(), "search complete");

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_serper_organic_results() {
        let body = r#"{
            "searchParameters": {"q": "site:python.langchain.com/docs Chroma DB"},
            "organic": [
                {"title": "Chroma", "link": "https://python.langchain.com/docs/chroma", "snippet": "Vector store", "position": 1},
                {"link": "https://python.langchain.com/docs/other"}
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.organic.len(), 2);
        assert_eq!(response.organic[0].title, "Chroma");
        assert_eq!(response.organic[1].link, "https://python.langchain.com/docs/other");
        assert!(response.organic[1].snippet.is_empty());
    }

    #[test]
    fn missing_organic_field_is_empty() {
        let response: SearchResponse = serde_json::from_str(r#"{"knowledgeGraph": {}}"#).unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(SerperRequest { q: "site:x y", num: 2 }).unwrap();
        assert_eq!(body, serde_json::json!({"q": "site:x y", "num": 2}));
    }

    #[test]
    fn new_keeps_configured_result_count() {
        let mut config = SearchConfig::new("test-key");
        config.num_results = 4;
        let client = SerperClient::new(&config).unwrap();
        assert_eq!(client.num_results, 4);
        assert_eq!(client.endpoint, crate::config::DEFAULT_SEARCH_ENDPOINT);
    }
}
