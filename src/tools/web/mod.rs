//! Web tools for search and page retrieval

pub mod extract;
mod fetch;
mod search;

pub use extract::visible_text;
pub use fetch::{FetchOutcome, PageFetcher, WebFetcher, is_blocked_ip};
pub use search::{SearchBackend, SearchResponse, SearchResult, SerperClient};
