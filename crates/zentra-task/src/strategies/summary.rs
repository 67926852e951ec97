use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use zentra_config::TaskCategory;
use zentra_extract::Outcome;
use zentra_fetch::excerpt;

use super::{extract_reply, fetch_page, unavailable_note};
use crate::{lenient, prompts};
use crate::result::{ExecutionResult, Payload, ResultStatus, SummaryPayload};
use crate::router::Router;
use crate::target::infer_url;

/// Characters of fetched text summarized.
pub const TEXT_LIMIT: usize = 10000;

/// The material to summarize and a label for where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySource {
  pub source: String,
  pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryReply {
  #[serde(deserialize_with = "lenient::string")]
  pub tldr: String,
  #[serde(deserialize_with = "lenient::string")]
  pub summary: String,
  #[serde(deserialize_with = "lenient::strings")]
  pub key_points: Vec<String>,
  #[serde(deserialize_with = "lenient::strings")]
  pub main_topics: Vec<String>,
  #[serde(deserialize_with = "lenient::opt_string")]
  pub sentiment: Option<String>,
  #[serde(deserialize_with = "lenient::opt_f64")]
  pub reading_time_minutes: Option<f64>,
}

async fn gather(router: &Router, description: &str) -> SummarySource {
  let Some(url) = infer_url(description) else {
    return SummarySource {
      source: "task description topic".to_string(),
      content: description.to_string(),
    };
  };

  info!(url = %url, "fetching content to summarize");
  match fetch_page(&*router.fetcher, &url).await {
    Outcome::Ok(page) => SummarySource {
      content: excerpt(&page.text, TEXT_LIMIT).to_string(),
      source: url,
    },
    other => SummarySource {
      source: "provided text".to_string(),
      content: format!(
        "Could not fetch {}: {}",
        url,
        other.reason().unwrap_or("unknown error")
      ),
    },
  }
}

pub(crate) async fn run(router: &Router, description: &str) -> ExecutionResult {
  let source = gather(router, description).await;

  let prompt = prompts::render(
    "summary",
    prompts::SUMMARY,
    json!({
      "description": description,
      "source": source.source,
      "content": source.content,
    }),
  );
  let reply = extract_reply(&*router.extractor, prompt, router.max_tokens).await;

  build_summary(&source.source, reply, Utc::now())
}

/// Decide the summarization result from its gathered inputs.
pub fn build_summary(
  source: &str,
  reply: Outcome<SummaryReply>,
  completed_at: DateTime<Utc>,
) -> ExecutionResult {
  match reply {
    Outcome::Ok(reply) => ExecutionResult {
      task_type: TaskCategory::ContentSummary,
      status: ResultStatus::Complete,
      summary: if reply.summary.is_empty() {
        reply.tldr.clone()
      } else {
        reply.summary
      },
      completed_at,
      note: None,
      error: None,
      payload: Payload::Summary(SummaryPayload {
        tldr: reply.tldr,
        key_points: reply.key_points,
        main_topics: reply.main_topics,
        sentiment: reply.sentiment,
        reading_time_minutes: reply.reading_time_minutes,
        source: source.to_string(),
      }),
    },
    degraded => ExecutionResult {
      task_type: TaskCategory::ContentSummary,
      status: ResultStatus::Degraded,
      summary: "Summary could not be completed: extraction service unavailable.".to_string(),
      completed_at,
      note: Some(unavailable_note(degraded.reason())),
      error: None,
      payload: Payload::Summary(SummaryPayload {
        tldr: String::new(),
        key_points: Vec::new(),
        main_topics: Vec::new(),
        sentiment: None,
        reading_time_minutes: None,
        source: source.to_string(),
      }),
    },
  }
}
