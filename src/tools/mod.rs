//! Tools exposed to the calling agent

mod docs;
pub mod registry;
pub mod web;

use std::sync::Arc;

pub use docs::{
    DocsTool, GetDocsParams, Library, NO_RESULTS, TIMEOUT_SENTINEL, TimeoutPolicy, scoped_query,
};
pub use registry::{Tool, ToolDefinition, ToolRegistry};
pub use web::{
    FetchOutcome, PageFetcher, SearchBackend, SearchResponse, SearchResult, SerperClient,
    WebFetcher,
};

use crate::{Config, Result};

/// Build the registry of tools served by this process
///
/// # Errors
///
/// Returns error if a tool cannot be constructed from the configuration
pub fn registry_from_config(config: &Config) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DocsTool::from_config(config)?));
    Ok(registry)
}
