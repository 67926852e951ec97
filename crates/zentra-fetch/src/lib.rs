//! Zentra Fetch
//!
//! Retrieval of remote documents for task execution, plus the markup helpers
//! that turn a fetched page into plain text, links and metadata.
//!
//! [`HttpFetcher`] follows redirects itself so that every hop counts against
//! both the configured hop cap and a single overall deadline.

mod error;
mod fetcher;
mod markup;

pub use error::FetchError;
pub use fetcher::{Fetch, HttpFetcher, Page};
pub use markup::{Link, MAX_LINKS, PageMeta, excerpt, extract_links, extract_meta, extract_text};
