use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zentra_config::TaskCategory;
use zentra_fetch::Link;

use crate::lenient;

/// How an execution attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
  /// Extraction succeeded.
  Complete,
  /// A deterministic fallback was produced without the extraction service.
  Degraded,
  /// The strategy could not gather its input.
  Error,
}

/// The outcome of executing one task, as published in the proof artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
  pub task_type: TaskCategory,
  pub status: ResultStatus,
  pub summary: String,
  pub completed_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub payload: Payload,
}

/// Category-specific result data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
  Retrieval(RetrievalPayload),
  Analysis(AnalysisPayload),
  Summary(SummaryPayload),
  Research(ResearchPayload),
  /// Error results that produced nothing.
  None,
}

impl Payload {
  /// Discriminant name, used to compare result shapes.
  pub fn kind(&self) -> &'static str {
    match self {
      Payload::Retrieval(_) => "retrieval",
      Payload::Analysis(_) => "analysis",
      Payload::Summary(_) => "summary",
      Payload::Research(_) => "research",
      Payload::None => "none",
    }
  }
}

/// Items pulled from a retrieved page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalPayload {
  pub url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  pub items: Vec<serde_json::Value>,
  pub item_count: usize,
}

impl RetrievalPayload {
  /// Payload made of the page's raw links.
  pub fn from_links(url: String, title: Option<String>, links: &[Link]) -> Self {
    let items: Vec<serde_json::Value> = links
      .iter()
      .map(|link| serde_json::json!({ "url": link.url, "text": link.text }))
      .collect();

    Self {
      url,
      title,
      item_count: items.len(),
      items,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
  #[serde(default, deserialize_with = "lenient::string")]
  pub metric: String,
  #[serde(default)]
  pub value: serde_json::Value,
  #[serde(
    default,
    deserialize_with = "lenient::opt_string",
    skip_serializing_if = "Option::is_none"
  )]
  pub unit: Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient::opt_string",
    skip_serializing_if = "Option::is_none"
  )]
  pub insight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
  pub methodology: String,
  pub findings: Vec<Finding>,
  /// Everything gathered before extraction (block samples, fetched text).
  pub raw_data: serde_json::Value,
  pub data_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPayload {
  pub tldr: String,
  pub key_points: Vec<String>,
  pub main_topics: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sentiment: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reading_time_minutes: Option<f64>,
  pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFinding {
  #[serde(default, deserialize_with = "lenient::string")]
  pub topic: String,
  #[serde(default, deserialize_with = "lenient::string")]
  pub detail: String,
  /// `high`, `medium` or `low`, as labelled by the extraction service.
  #[serde(default, deserialize_with = "lenient::string")]
  pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopResult {
  #[serde(default, deserialize_with = "lenient::string")]
  pub name: String,
  #[serde(default, deserialize_with = "lenient::string")]
  pub description: String,
  #[serde(
    default,
    deserialize_with = "lenient::opt_string",
    skip_serializing_if = "Option::is_none"
  )]
  pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPayload {
  pub findings: Vec<ResearchFinding>,
  pub recommendations: Vec<String>,
  pub pros: Vec<String>,
  pub cons: Vec<String>,
  pub top_results: Vec<TopResult>,
  pub sources: Vec<String>,
}
