//! Execution strategies, one per task category.
//!
//! Each strategy gathers its inputs (fetching, ledger reads, extraction) in an
//! async `run` and hands the tagged results to a pure `build_*` function that
//! decides the final [`ExecutionResult`](crate::ExecutionResult). Builders
//! never fail: a missing or broken input selects a fallback shape.

pub mod analysis;
pub mod research;
pub mod retrieval;
pub mod summary;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use zentra_extract::{ExtractionRequest, Extractor, Outcome};
use zentra_fetch::{Fetch, Link, extract_links, extract_meta, extract_text};

use crate::error::TaskError;

pub use analysis::{AnalysisContext, AnalysisReply, build_analysis};
pub use research::{ResearchReply, build_research};
pub use retrieval::{RetrievalReply, build_retrieval};
pub use summary::{SummaryReply, SummarySource, build_summary};

/// A fetched page reduced to what the strategies use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
  pub url: String,
  pub status: u16,
  pub title: Option<String>,
  pub description: Option<String>,
  pub text: String,
  pub links: Vec<Link>,
}

pub(crate) async fn fetch_page(fetcher: &dyn Fetch, url: &str) -> Outcome<PageContent> {
  let page = match fetcher.fetch(url).await {
    Ok(page) => page,
    Err(e) => {
      warn!(url = %url, error = %e, "fetch failed");
      return Outcome::Failed(e.to_string());
    }
  };

  // Links resolve against the origin of the URL that was asked for.
  let links = match url::Url::parse(url) {
    Ok(base) => extract_links(&page.body, &base),
    Err(_) => Vec::new(),
  };
  let meta = extract_meta(&page.body);
  let text = extract_text(&page.body);
  debug!(url = %page.url, status = page.status, chars = text.len(), "page fetched");

  Outcome::Ok(PageContent {
    url: page.url,
    status: page.status,
    title: meta.title,
    description: meta.description,
    text,
    links,
  })
}

/// Send a rendered prompt and decode the reply into `T`.
///
/// A reply that does not fit `T` is treated as degraded, like any other
/// unusable reply.
pub(crate) async fn extract_reply<T: DeserializeOwned>(
  extractor: &dyn Extractor,
  prompt: Result<String, TaskError>,
  max_tokens: u32,
) -> Outcome<T> {
  let prompt = match prompt {
    Ok(prompt) => prompt,
    Err(e) => return Outcome::Failed(e.to_string()),
  };

  extractor
    .extract(ExtractionRequest { prompt, max_tokens })
    .await
    .and_then(|value| serde_json::from_value::<T>(value))
}

pub(crate) fn unavailable_note(reason: Option<&str>) -> String {
  match reason {
    Some(reason) => format!("extraction unavailable: {}", reason),
    None => "extraction unavailable".to_string(),
  }
}
