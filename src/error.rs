//! Error types for docs lookup

use thiserror::Error;

/// Result type alias for docs lookup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving documentation lookups
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Library key outside the supported set
    #[error("library {0} not supported by this tool (supported: {supported})", supported = crate::tools::Library::supported_list())]
    UnsupportedLibrary(String),

    /// Search request failed for a reason other than a timeout
    #[error("search request failed: {0}")]
    SearchTransport(#[source] reqwest::Error),

    /// Search provider returned a body that is not the expected JSON
    #[error("search response could not be decoded: {0}")]
    SearchDecode(String),

    /// Page fetch error (request failures, blocked hosts)
    #[error("web fetch error: {0}")]
    WebFetch(String),

    /// No tool registered under this name
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments did not match the input schema
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// HTTP client construction error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
