//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docs_lookup::{FetchOutcome, PageFetcher, SearchBackend, SearchResponse, SearchResult};
use tokio::sync::Mutex;

/// Build a search response from links
#[must_use]
pub fn response_with_links(links: &[&str]) -> SearchResponse {
    SearchResponse {
        organic: links
            .iter()
            .map(|link| SearchResult {
                title: String::new(),
                link: (*link).to_string(),
                snippet: String::new(),
            })
            .collect(),
    }
}

/// Mock search backend that records every query
pub struct MockSearch {
    response: SearchResponse,
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearch {
    pub fn new(response: SearchResponse) -> Self {
        Self {
            response,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn recorded(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl SearchBackend for MockSearch {
    async fn search(&self, query: &str) -> docs_lookup::Result<SearchResponse> {
        self.queries.lock().await.push(query.to_string());
        Ok(self.response.clone())
    }
}

/// Mock search backend that always fails like a transport error
pub struct FailingSearch;

#[async_trait]
impl SearchBackend for FailingSearch {
    async fn search(&self, _query: &str) -> docs_lookup::Result<SearchResponse> {
        Err(docs_lookup::Error::SearchDecode("upstream returned garbage".to_string()))
    }
}

/// Canned page for a URL
#[derive(Clone)]
pub enum Page {
    Text(&'static str),
    /// Text returned after a delay
    Slow(&'static str, Duration),
    TimedOut,
    Fails,
}

/// Mock page fetcher that records every URL it is asked for
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, Page>,
    pub fetched: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: &str, page: Page) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub async fn recorded(&self) -> Vec<String> {
        self.fetched.lock().await.clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> docs_lookup::Result<FetchOutcome> {
        self.fetched.lock().await.push(url.to_string());

        match self.pages.get(url).cloned() {
            Some(Page::Text(text)) => Ok(FetchOutcome::Text(text.to_string())),
            Some(Page::Slow(text, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(FetchOutcome::Text(text.to_string()))
            }
            Some(Page::TimedOut) => Ok(FetchOutcome::TimedOut),
            Some(Page::Fails) | None => Err(docs_lookup::Error::WebFetch(format!(
                "Request failed: no page for {url}"
            ))),
        }
    }
}
