//! Documentation lookup — the `get_docs` tool
//!
//! Searches a library's documentation site, fetches the top hits and returns
//! their visible text concatenated in result order.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::registry::Tool;
use super::web::{FetchOutcome, PageFetcher, SearchBackend, SerperClient, WebFetcher};
use crate::config::Config;
use crate::{Error, Result};

/// Returned when the search yields no organic results
pub const NO_RESULTS: &str = "No results found";

/// Stands in for a page whose fetch timed out under [`TimeoutPolicy::Sentinel`]
pub const TIMEOUT_SENTINEL: &str = "Timeout error";

/// Libraries whose documentation can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Library {
    LangChain,
    LlamaIndex,
    OpenAi,
}

impl Library {
    /// Every supported library
    pub const ALL: [Self; 3] = [Self::LangChain, Self::LlamaIndex, Self::OpenAi];

    /// Key callers pass to select this library
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::LangChain => "langchain",
            Self::LlamaIndex => "llama-index",
            Self::OpenAi => "openai",
        }
    }

    /// Host and path prefix of the documentation site
    #[must_use]
    pub const fn docs_base_url(self) -> &'static str {
        match self {
            Self::LangChain => "python.langchain.com/docs",
            Self::LlamaIndex => "docs.llamaindex.ai/en/stable",
            Self::OpenAi => "platform.openai.com/docs",
        }
    }

    /// Comma-separated list of supported keys
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL.map(Self::key).join(", ")
    }
}

impl FromStr for Library {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|lib| lib.key() == s)
            .ok_or_else(|| Error::UnsupportedLibrary(s.to_string()))
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Build the site-restricted search query for a library
#[must_use]
pub fn scoped_query(library: Library, query: &str) -> String {
    format!("site:{} {query}", library.docs_base_url())
}

/// What a timed-out page fetch contributes to the answer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Append [`TIMEOUT_SENTINEL`] in the page's place
    #[default]
    Sentinel,
    /// Leave the page out
    Skip,
}

impl FromStr for TimeoutPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sentinel" => Ok(Self::Sentinel),
            "skip" => Ok(Self::Skip),
            other => Err(Error::Config(format!(
                "unknown timeout policy {other:?} (expected \"sentinel\" or \"skip\")"
            ))),
        }
    }
}

/// Arguments of the `get_docs` tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetDocsParams {
    /// The query to search for (e.g. "Chroma DB")
    pub query: String,
    /// The library to search in: "langchain", "llama-index" or "openai"
    pub library: String,
}

/// Documentation lookup tool
pub struct DocsTool {
    search: Arc<dyn SearchBackend>,
    fetcher: Arc<dyn PageFetcher>,
    on_timeout: TimeoutPolicy,
}

impl DocsTool {
    pub const NAME: &'static str = "get_docs";

    const DESCRIPTION: &'static str = "Search the latest docs for a given query and library. \
        Supports langchain, openai, and llama-index. Returns text from the docs.";

    /// Create a tool over the given search backend and page fetcher
    #[must_use]
    pub fn new(search: Arc<dyn SearchBackend>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            search,
            fetcher,
            on_timeout: TimeoutPolicy::default(),
        }
    }

    /// Set how timed-out page fetches are reported
    #[must_use]
    pub fn with_timeout_policy(mut self, on_timeout: TimeoutPolicy) -> Self {
        self.on_timeout = on_timeout;
        self
    }

    /// Build the tool with the Serper client and HTTP fetcher
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self> {
        let search = SerperClient::new(&config.search)?;
        let fetcher = WebFetcher::new(&config.fetch)?;
        Ok(Self::new(Arc::new(search), Arc::new(fetcher))
            .with_timeout_policy(config.fetch.on_timeout))
    }

    /// Look up `query` in the documentation of `library`
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedLibrary` before any network call if `library` is
    /// unknown; search transport and page fetch failures propagate
    pub async fn invoke(&self, query: &str, library: &str) -> Result<String> {
        let library: Library = library.parse()?;
        let scoped = scoped_query(library, query);

        tracing::info!(%library, query, "looking up docs");

        let results = self.search.search(&scoped).await?;
        if results.is_empty() {
            tracing::info!(%library, query, "no search results");
            return Ok(NO_RESULTS.to_string());
        }

        let pages = try_join_all(
            results
                .organic
                .iter()
                .map(|result| self.fetcher.fetch(&result.link)),
        )
        .await?;

        let mut text = String::new();
        for page in pages {
            match page {
                FetchOutcome::Text(page_text) => text.push_str(&page_text),
                FetchOutcome::TimedOut => {
                    if self.on_timeout == TimeoutPolicy::Sentinel {
                        text.push_str(TIMEOUT_SENTINEL);
                    }
                }
            }
        }

        tracing::debug!(%library, pages = results.organic.len(), chars = text.len(), "lookup complete");

        Ok(text)
    }
}

#[async_trait]
impl Tool for DocsTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn input_schema(&self) -> Map<String, Value> {
        match serde_json::to_value(schemars::schema_for!(GetDocsParams)) {
            Ok(Value::Object(schema)) => schema,
            _ => Map::new(),
        }
    }

    async fn call(&self, arguments: Value) -> Result<String> {
        let params: GetDocsParams = serde_json::from_value(arguments)
            .map_err(|e| Error::InvalidArguments(e.to_string()))?;
        self.invoke(&params.query, &params.library).await
    }
}
