//! Docs Lookup - documentation search tool for AI agents
//!
//! Exposes one MCP tool, `get_docs`, that answers a query from a library's
//! documentation site:
//!
//! ```text
//! get_docs(query, library)
//!   │
//!   ├─ Library registry     langchain → python.langchain.com/docs, ...
//!   ├─ Search (Serper)      "site:<docs> <query>", top 2 organic hits
//!   ├─ Fetch + extract      GET each hit, strip markup
//!   └─ Concatenate          page texts in result order
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};
pub use server::DocsServer;
pub use tools::{
    DocsTool, FetchOutcome, Library, PageFetcher, SearchBackend, SearchResponse, SearchResult,
    TimeoutPolicy, Tool, ToolRegistry, registry_from_config,
};
