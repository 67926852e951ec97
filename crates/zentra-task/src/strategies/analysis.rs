use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use zentra_config::TaskCategory;
use zentra_extract::Outcome;
use zentra_fetch::excerpt;
use zentra_ledger::{BlockSummary, Ledger, LedgerError};

use super::{extract_reply, fetch_page, unavailable_note};
use crate::{lenient, prompts};
use crate::result::{AnalysisPayload, ExecutionResult, Finding, Payload, ResultStatus};
use crate::router::Router;
use crate::target::find_url;

/// Characters of fetched text kept in the context.
pub const TEXT_LIMIT: usize = 5000;

/// Number of recent blocks sampled for on-chain questions.
pub const BLOCK_SAMPLE: u64 = 10;

/// Data gathered before asking for the analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub latest_block: Option<u64>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub block_samples: Vec<BlockSummary>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avg_tx_per_block: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chain_error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fetched_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fetched_text: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fetch_error: Option<String>,
}

impl AnalysisContext {
  pub fn is_empty(&self) -> bool {
    *self == AnalysisContext::default()
  }

  /// Where the gathered data came from, for the payload's `dataSource`.
  pub fn data_source(&self) -> String {
    let mut sources = Vec::new();
    if self.latest_block.is_some() {
      sources.push("ledger block samples".to_string());
    }
    if let Some(url) = &self.fetched_url {
      sources.push(url.clone());
    }

    if sources.is_empty() {
      "no external data".to_string()
    } else {
      sources.join(", ")
    }
  }

  fn to_value(&self) -> serde_json::Value {
    serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisReply {
  #[serde(deserialize_with = "lenient::string")]
  pub summary: String,
  #[serde(deserialize_with = "lenient::string")]
  pub methodology: String,
  #[serde(deserialize_with = "lenient::list")]
  pub findings: Vec<Finding>,
  pub raw_data: serde_json::Value,
  #[serde(deserialize_with = "lenient::string")]
  pub data_source: String,
}

fn mentions_chain(description: &str) -> bool {
  let lower = description.to_lowercase();
  ["monad", "transaction", "block"]
    .iter()
    .any(|k| lower.contains(k))
}

/// Mean transaction count per block, rounded to two decimals.
pub fn average_tx_per_block(samples: &[BlockSummary]) -> f64 {
  if samples.is_empty() {
    return 0.0;
  }
  let total: usize = samples.iter().map(|s| s.tx_count).sum();
  let mean = total as f64 / samples.len() as f64;
  (mean * 100.0).round() / 100.0
}

/// Read the latest [`BLOCK_SAMPLE`] blocks, newest first.
pub async fn sample_blocks(ledger: &dyn Ledger) -> Result<(u64, Vec<BlockSummary>), LedgerError> {
  let latest = ledger.block_height().await?;
  let mut samples = Vec::new();

  for offset in 0..BLOCK_SAMPLE {
    let Some(height) = latest.checked_sub(offset) else {
      break;
    };
    if let Some(summary) = ledger.block_summary(height).await? {
      samples.push(summary);
    }
  }

  Ok((latest, samples))
}

pub(crate) async fn run(router: &Router, description: &str) -> ExecutionResult {
  let mut context = AnalysisContext::default();

  if mentions_chain(description) {
    match sample_blocks(&*router.ledger).await {
      Ok((latest, samples)) => {
        let avg = average_tx_per_block(&samples);
        info!(latest_block = latest, samples = samples.len(), avg_tx_per_block = avg, "sampled blocks");
        context.latest_block = Some(latest);
        context.avg_tx_per_block = Some(avg);
        context.block_samples = samples;
      }
      Err(e) => {
        warn!(error = %e, "block sampling failed");
        context.chain_error = Some(e.to_string());
      }
    }
  }

  if let Some(url) = find_url(description) {
    match fetch_page(&*router.fetcher, &url).await {
      Outcome::Ok(page) => context.fetched_text = Some(excerpt(&page.text, TEXT_LIMIT).to_string()),
      other => context.fetch_error = other.reason().map(str::to_string),
    }
    context.fetched_url = Some(url);
  }

  let rendered_context = if context.is_empty() {
    String::new()
  } else {
    serde_json::to_string_pretty(&context).unwrap_or_default()
  };
  let prompt = prompts::render(
    "analysis",
    prompts::ANALYSIS,
    json!({ "description": description, "context": rendered_context }),
  );
  let reply = extract_reply(&*router.extractor, prompt, router.max_tokens).await;

  build_analysis(context, reply, Utc::now())
}

/// Decide the analysis result from its gathered inputs.
pub fn build_analysis(
  context: AnalysisContext,
  reply: Outcome<AnalysisReply>,
  completed_at: DateTime<Utc>,
) -> ExecutionResult {
  match reply {
    Outcome::Ok(reply) => {
      let raw_data = if reply.raw_data.is_null() {
        context.to_value()
      } else {
        reply.raw_data
      };
      let data_source = if reply.data_source.is_empty() {
        context.data_source()
      } else {
        reply.data_source
      };

      ExecutionResult {
        task_type: TaskCategory::DataAnalysis,
        status: ResultStatus::Complete,
        summary: reply.summary,
        completed_at,
        note: None,
        error: None,
        payload: Payload::Analysis(AnalysisPayload {
          methodology: reply.methodology,
          findings: reply.findings,
          raw_data,
          data_source,
        }),
      }
    }
    degraded => ExecutionResult {
      task_type: TaskCategory::DataAnalysis,
      status: ResultStatus::Degraded,
      summary: "Analysis could not be completed: extraction service unavailable.".to_string(),
      completed_at,
      note: Some(unavailable_note(degraded.reason())),
      error: None,
      payload: Payload::Analysis(AnalysisPayload {
        methodology: String::new(),
        findings: Vec::new(),
        raw_data: context.to_value(),
        data_source: context.data_source(),
      }),
    },
  }
}
