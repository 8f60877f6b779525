//! TOML configuration file loading
//!
//! Supports `~/.config/docs-lookup/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct DocsConfigFile {
    /// Search provider configuration
    #[serde(default)]
    pub search: SearchFileConfig,

    /// Page fetch configuration
    #[serde(default)]
    pub fetch: FetchFileConfig,
}

/// Search provider configuration
#[derive(Debug, Default, Deserialize)]
pub struct SearchFileConfig {
    /// Serper API key
    pub api_key: Option<String>,

    /// Search endpoint (e.g. `https://google.serper.dev/search`)
    pub endpoint: Option<String>,

    /// Number of organic results to request
    pub num_results: Option<usize>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Page fetch configuration
#[derive(Debug, Default, Deserialize)]
pub struct FetchFileConfig {
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// User agent sent with page requests
    pub user_agent: Option<String>,

    /// What a timed-out page contributes: "sentinel" or "skip"
    pub on_timeout: Option<String>,

    /// Permit fetching pages that resolve to loopback/private addresses
    pub allow_private_hosts: Option<bool>,
}

/// Load the config file at `path`, or the default location when `None`
///
/// Returns `DocsConfigFile::default()` if the file doesn't exist or can't be parsed.
/// A missing file is only logged when `path` was given explicitly.
pub fn load_config_file(path: Option<&Path>) -> DocsConfigFile {
    let explicit = path.is_some();
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return DocsConfigFile::default();
    };

    if !path.exists() {
        if explicit {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
        }
        return DocsConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                DocsConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            DocsConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/docs-lookup/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("docs-lookup").join("config.toml"))
}
