use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use zentra_config::TaskCategory;
use zentra_extract::Outcome;
use zentra_fetch::excerpt;

use super::{extract_reply, fetch_page, unavailable_note};
use crate::{lenient, prompts};
use crate::result::{ExecutionResult, Payload, ResearchFinding, ResearchPayload, ResultStatus, TopResult};
use crate::router::Router;
use crate::target::infer_url;

/// Characters of grounding text included in the prompt.
pub const TEXT_LIMIT: usize = 6000;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProsAndCons {
  #[serde(deserialize_with = "lenient::strings")]
  pub pros: Vec<String>,
  #[serde(deserialize_with = "lenient::strings")]
  pub cons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResearchReply {
  #[serde(deserialize_with = "lenient::string")]
  pub summary: String,
  #[serde(deserialize_with = "lenient::list")]
  pub findings: Vec<ResearchFinding>,
  #[serde(deserialize_with = "lenient::strings")]
  pub recommendations: Vec<String>,
  #[serde(deserialize_with = "lenient::or_default")]
  pub pros_and_cons: ProsAndCons,
  #[serde(deserialize_with = "lenient::list")]
  pub top_results: Vec<TopResult>,
  #[serde(deserialize_with = "lenient::strings")]
  pub sources: Vec<String>,
}

pub(crate) async fn run(router: &Router, description: &str) -> ExecutionResult {
  let url = infer_url(description);

  // Grounding is best effort; a failed fetch only loses context.
  let context = match url.as_deref() {
    Some(url) => {
      info!(url = %url, "fetching research source");
      fetch_page(&*router.fetcher, url)
        .await
        .ok()
        .map(|page| excerpt(&page.text, TEXT_LIMIT).to_string())
    }
    None => None,
  };

  let prompt = prompts::render(
    "research",
    prompts::RESEARCH,
    json!({
      "description": description,
      "url": url,
      "context": context,
    }),
  );
  let reply = extract_reply(&*router.extractor, prompt, router.max_tokens).await;

  build_research(url.as_deref(), reply, Utc::now())
}

fn default_sources(url: Option<&str>) -> Vec<String> {
  vec![url.unwrap_or("training knowledge").to_string()]
}

/// Decide the research result from its gathered inputs.
pub fn build_research(
  url: Option<&str>,
  reply: Outcome<ResearchReply>,
  completed_at: DateTime<Utc>,
) -> ExecutionResult {
  match reply {
    Outcome::Ok(reply) => ExecutionResult {
      task_type: TaskCategory::Research,
      status: ResultStatus::Complete,
      summary: reply.summary,
      completed_at,
      note: None,
      error: None,
      payload: Payload::Research(ResearchPayload {
        findings: reply.findings,
        recommendations: reply.recommendations,
        pros: reply.pros_and_cons.pros,
        cons: reply.pros_and_cons.cons,
        top_results: reply.top_results,
        sources: if reply.sources.is_empty() {
          default_sources(url)
        } else {
          reply.sources
        },
      }),
    },
    degraded => ExecutionResult {
      task_type: TaskCategory::Research,
      status: ResultStatus::Degraded,
      summary: "Research could not be completed: extraction service unavailable.".to_string(),
      completed_at,
      note: Some(unavailable_note(degraded.reason())),
      error: None,
      payload: Payload::Research(ResearchPayload {
        sources: url.map(|u| vec![u.to_string()]).unwrap_or_default(),
        ..ResearchPayload::default()
      }),
    },
  }
}
