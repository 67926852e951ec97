use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use zentra_config::TaskCategory;
use zentra_extract::Outcome;
use zentra_fetch::excerpt;

use super::{PageContent, extract_reply, fetch_page, unavailable_note};
use crate::{lenient, prompts};
use crate::result::{ExecutionResult, Payload, ResultStatus, RetrievalPayload};
use crate::router::Router;
use crate::target::infer_url;

/// Characters of page text included in the prompt.
pub const TEXT_LIMIT: usize = 8000;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalReply {
  #[serde(deserialize_with = "lenient::string")]
  pub summary: String,
  #[serde(deserialize_with = "lenient::opt_string")]
  pub page_title: Option<String>,
  #[serde(deserialize_with = "lenient::values")]
  pub data: Vec<serde_json::Value>,
  #[serde(deserialize_with = "lenient::opt_usize")]
  pub item_count: Option<usize>,
}

pub(crate) async fn run(router: &Router, description: &str) -> ExecutionResult {
  let target = infer_url(description);

  let Some(url) = target.as_deref() else {
    return build_retrieval(
      None,
      Outcome::Failed("no target".to_string()),
      Outcome::Degraded("not attempted".to_string()),
      Utc::now(),
    );
  };

  info!(url = %url, "retrieving page");
  let page = fetch_page(&*router.fetcher, url).await;

  let reply = match &page {
    Outcome::Ok(content) => {
      let prompt = prompts::render(
        "retrieval",
        prompts::RETRIEVAL,
        json!({
          "description": description,
          "url": url,
          "title": content.title.clone().unwrap_or_default(),
          "limit": TEXT_LIMIT,
          "text": excerpt(&content.text, TEXT_LIMIT),
        }),
      );
      extract_reply(&*router.extractor, prompt, router.max_tokens).await
    }
    _ => Outcome::Degraded("page not retrieved".to_string()),
  };

  build_retrieval(target.as_deref(), page, reply, Utc::now())
}

/// Decide the retrieval result from its gathered inputs.
pub fn build_retrieval(
  target: Option<&str>,
  page: Outcome<PageContent>,
  reply: Outcome<RetrievalReply>,
  completed_at: DateTime<Utc>,
) -> ExecutionResult {
  let Some(url) = target else {
    return ExecutionResult {
      task_type: TaskCategory::WebScraping,
      status: ResultStatus::Error,
      summary: "No URL or recognizable site found in task description.".to_string(),
      completed_at,
      note: Some(
        "Include a URL (e.g. https://example.com) or mention a known site like Amazon, Hacker News, GitHub."
          .to_string(),
      ),
      error: Some("no target URL".to_string()),
      payload: Payload::None,
    };
  };

  let page = match page {
    Outcome::Ok(page) => page,
    other => {
      return ExecutionResult {
        task_type: TaskCategory::WebScraping,
        status: ResultStatus::Error,
        summary: format!("Could not retrieve {}.", url),
        completed_at,
        note: Some("Site may block bots or require authentication".to_string()),
        error: Some(other.reason().unwrap_or("fetch failed").to_string()),
        payload: Payload::Retrieval(RetrievalPayload {
          url: url.to_string(),
          title: None,
          items: Vec::new(),
          item_count: 0,
        }),
      };
    }
  };

  match reply {
    Outcome::Ok(reply) => {
      let title = reply
        .page_title
        .filter(|t| !t.is_empty())
        .or(page.title);
      let item_count = reply.item_count.unwrap_or(reply.data.len());
      let summary = if reply.summary.is_empty() {
        format!("Extracted {} items from {}.", item_count, url)
      } else {
        reply.summary
      };

      ExecutionResult {
        task_type: TaskCategory::WebScraping,
        status: ResultStatus::Complete,
        summary,
        completed_at,
        note: None,
        error: None,
        payload: Payload::Retrieval(RetrievalPayload {
          url: url.to_string(),
          title,
          items: reply.data,
          item_count,
        }),
      }
    }
    degraded => {
      let label = page.title.as_deref().unwrap_or(url);
      let summary = match page.description.as_deref() {
        Some(description) => format!("Scraped {}. {}", label, description),
        None => format!("Scraped {}.", label),
      };

      ExecutionResult {
        task_type: TaskCategory::WebScraping,
        status: ResultStatus::Degraded,
        summary,
        completed_at,
        note: Some(format!(
          "{}; returning raw links extracted from page",
          unavailable_note(degraded.reason())
        )),
        error: None,
        payload: Payload::Retrieval(RetrievalPayload::from_links(
          url.to_string(),
          page.title,
          &page.links,
        )),
      }
    }
  }
}
