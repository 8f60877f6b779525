//! Configuration management for docs lookup
//!
//! Values resolve with priority env > toml > default. The API key has no
//! default and must come from `SERPER_API_KEY` or the config file.

pub mod file;

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;

use crate::tools::TimeoutPolicy;
use crate::{Error, Result};

pub use file::{DocsConfigFile, load_config_file};

/// Default Serper search endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";

/// Default number of organic results requested per lookup
pub const DEFAULT_NUM_RESULTS: usize = 2;

/// Default timeout for each outbound request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with page fetches unless overridden
pub const DEFAULT_USER_AGENT: &str = concat!("docs-lookup/", env!("CARGO_PKG_VERSION"));

/// Docs lookup configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Search provider configuration
    pub search: SearchConfig,

    /// Page fetch configuration
    pub fetch: FetchConfig,
}

/// Search provider configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Serper API key (sent as `X-API-KEY`)
    pub api_key: SecretString,

    /// Search endpoint URL
    pub endpoint: String,

    /// Number of organic results to request
    pub num_results: usize,

    /// Request timeout
    pub timeout: Duration,
}

impl SearchConfig {
    /// Search config with default endpoint, result count and timeout
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            num_results: DEFAULT_NUM_RESULTS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Page fetch configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout
    pub timeout: Duration,

    /// User agent header value
    pub user_agent: String,

    /// What a timed-out page contributes to the answer
    pub on_timeout: TimeoutPolicy,

    /// Permit fetching pages that resolve to loopback/private addresses
    pub allow_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            on_timeout: TimeoutPolicy::default(),
            allow_private_hosts: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment and the config file
    ///
    /// `config_path` overrides the default file location.
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured or a value is out of range
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let fc = load_config_file(config_path);
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured or a value is out of range
    pub fn from_sources<F>(fc: DocsConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = env("SERPER_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .or(fc.search.api_key)
            .ok_or_else(|| {
                Error::Config(
                    "SERPER_API_KEY is not set (env or search.api_key in config file)".to_string(),
                )
            })?;

        let search = SearchConfig {
            api_key: SecretString::from(api_key),
            endpoint: env("SERPER_URL")
                .or(fc.search.endpoint)
                .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            num_results: env("DOCS_LOOKUP_NUM_RESULTS")
                .and_then(|s| s.parse().ok())
                .or(fc.search.num_results)
                .unwrap_or(DEFAULT_NUM_RESULTS),
            timeout: env("DOCS_LOOKUP_SEARCH_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .or(fc.search.timeout_secs)
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
        };

        let on_timeout = match env("DOCS_LOOKUP_ON_TIMEOUT").or(fc.fetch.on_timeout) {
            Some(s) => s.parse()?,
            None => TimeoutPolicy::default(),
        };

        let fetch = FetchConfig {
            timeout: env("DOCS_LOOKUP_FETCH_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .or(fc.fetch.timeout_secs)
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            user_agent: env("DOCS_LOOKUP_USER_AGENT")
                .or(fc.fetch.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            on_timeout,
            allow_private_hosts: env("DOCS_LOOKUP_ALLOW_PRIVATE_HOSTS")
                .map(|v| v == "true" || v == "1")
                .or(fc.fetch.allow_private_hosts)
                .unwrap_or(false),
        };

        let config = Self { search, fetch };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.search.num_results == 0 {
            return Err(Error::Config("search.num_results must be at least 1".to_string()));
        }
        if self.search.timeout.is_zero() || self.fetch.timeout.is_zero() {
            return Err(Error::Config("timeouts must be at least 1 second".to_string()));
        }
        url::Url::parse(&self.search.endpoint)
            .map_err(|e| Error::Config(format!("invalid search endpoint: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_with_only_api_key() {
        let config =
            Config::from_sources(DocsConfigFile::default(), env_from(&[("SERPER_API_KEY", "k")]))
                .unwrap();

        assert_eq!(config.search.api_key.expose_secret(), "k");
        assert_eq!(config.search.endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert_eq!(config.search.num_results, 2);
        assert_eq!(config.search.timeout, Duration::from_secs(30));
        assert_eq!(config.fetch.timeout, Duration::from_secs(30));
        assert_eq!(config.fetch.on_timeout, TimeoutPolicy::Sentinel);
        assert!(!config.fetch.allow_private_hosts);
        assert!(config.fetch.user_agent.starts_with("docs-lookup/"));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Config::from_sources(DocsConfigFile::default(), env_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("SERPER_API_KEY")));
    }

    #[test]
    fn blank_env_key_falls_back_to_file() {
        let mut fc = DocsConfigFile::default();
        fc.search.api_key = Some("file-key".to_string());

        let config = Config::from_sources(fc, env_from(&[("SERPER_API_KEY", "  ")])).unwrap();
        assert_eq!(config.search.api_key.expose_secret(), "file-key");
    }

    #[test]
    fn env_overrides_file() {
        let mut fc = DocsConfigFile::default();
        fc.search.api_key = Some("file-key".to_string());
        fc.search.num_results = Some(5);
        fc.fetch.timeout_secs = Some(10);
        fc.fetch.on_timeout = Some("skip".to_string());

        let config = Config::from_sources(
            fc,
            env_from(&[
                ("SERPER_API_KEY", "env-key"),
                ("DOCS_LOOKUP_NUM_RESULTS", "3"),
                ("DOCS_LOOKUP_ON_TIMEOUT", "sentinel"),
            ]),
        )
        .unwrap();

        assert_eq!(config.search.api_key.expose_secret(), "env-key");
        assert_eq!(config.search.num_results, 3);
        assert_eq!(config.fetch.timeout, Duration::from_secs(10));
        assert_eq!(config.fetch.on_timeout, TimeoutPolicy::Sentinel);
    }

    #[test]
    fn unparseable_number_falls_back() {
        let config = Config::from_sources(
            DocsConfigFile::default(),
            env_from(&[("SERPER_API_KEY", "k"), ("DOCS_LOOKUP_SEARCH_TIMEOUT", "soon")]),
        )
        .unwrap();
        assert_eq!(config.search.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn rejects_zero_results() {
        let err = Config::from_sources(
            DocsConfigFile::default(),
            env_from(&[("SERPER_API_KEY", "k"), ("DOCS_LOOKUP_NUM_RESULTS", "0")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_unknown_timeout_policy() {
        let err = Config::from_sources(
            DocsConfigFile::default(),
            env_from(&[("SERPER_API_KEY", "k"), ("DOCS_LOOKUP_ON_TIMEOUT", "retry")]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let config =
            Config::from_sources(DocsConfigFile::default(), env_from(&[("SERPER_API_KEY", "hunter2")]))
                .unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
