use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};
use zentra_config::{AcceptanceConfig, AcceptancePolicy, ExtractionConfig, TaskCategory};
use zentra_extract::Extractor;
use zentra_fetch::Fetch;
use zentra_ledger::Ledger;

use crate::classify::{Classification, classify, strip_category_tag};
use crate::result::ExecutionResult;
use crate::strategies::{analysis, research, retrieval, summary};

/// Feasibility verdict for a task description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
  pub classification: Classification,
  pub accepted: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
}

/// Classify `description` and apply the capability list and acceptance policy.
pub fn evaluate(
  description: &str,
  capabilities: &[TaskCategory],
  acceptance: &AcceptanceConfig,
) -> Evaluation {
  let classification = classify(description);

  let reason = if !capabilities.contains(&classification.category) {
    Some(format!("{} is not among this worker's capabilities", classification.category))
  } else if acceptance.policy == AcceptancePolicy::MinConfidence
    && classification.confidence < acceptance.min_confidence
  {
    Some(format!(
      "confidence {:.2} is below the minimum {:.2}",
      classification.confidence, acceptance.min_confidence
    ))
  } else {
    None
  };

  Evaluation {
    classification,
    accepted: reason.is_none(),
    reason,
  }
}

/// A finished execution: what was run and what came out.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
  pub task_id: u64,
  pub classification: Classification,
  /// Description with any category tag removed.
  pub description: String,
  pub result: ExecutionResult,
}

/// Classifies task descriptions and runs the matching strategy.
pub struct Router {
  pub(crate) fetcher: Arc<dyn Fetch>,
  pub(crate) extractor: Arc<dyn Extractor>,
  pub(crate) ledger: Arc<dyn Ledger>,
  pub(crate) max_tokens: u32,
  capabilities: Vec<TaskCategory>,
  acceptance: AcceptanceConfig,
}

impl Router {
  pub fn new(fetcher: Arc<dyn Fetch>, extractor: Arc<dyn Extractor>, ledger: Arc<dyn Ledger>) -> Self {
    Self {
      fetcher,
      extractor,
      ledger,
      max_tokens: ExtractionConfig::default().max_tokens,
      capabilities: TaskCategory::ALL.to_vec(),
      acceptance: AcceptanceConfig::default(),
    }
  }

  pub fn with_capabilities(mut self, capabilities: Vec<TaskCategory>) -> Self {
    self.capabilities = capabilities;
    self
  }

  pub fn with_acceptance(mut self, acceptance: AcceptanceConfig) -> Self {
    self.acceptance = acceptance;
    self
  }

  pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
    self.max_tokens = max_tokens;
    self
  }

  /// Decide whether the worker should take on a task.
  pub fn evaluate(&self, description: &str) -> Evaluation {
    evaluate(description, &self.capabilities, &self.acceptance)
  }

  /// Classify and execute a task. Always yields a result.
  #[instrument(skip(self, description))]
  pub async fn execute(&self, task_id: u64, description: &str) -> Execution {
    let classification = classify(description);
    let cleaned = strip_category_tag(description);

    info!(
      category = %classification.category,
      confidence = classification.confidence,
      "routing task"
    );

    let result = match classification.category {
      TaskCategory::WebScraping => retrieval::run(self, &cleaned).await,
      TaskCategory::DataAnalysis => analysis::run(self, &cleaned).await,
      TaskCategory::ContentSummary => summary::run(self, &cleaned).await,
      TaskCategory::Research => research::run(self, &cleaned).await,
    };

    info!(status = ?result.status, "execution finished");

    Execution {
      task_id,
      classification,
      description: cleaned,
      result,
    }
  }
}
