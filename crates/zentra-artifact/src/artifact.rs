use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zentra_task::ExecutionResult;

use crate::error::PublishError;

/// The published record of one execution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifact {
  pub task_id: u64,
  pub task_description: String,
  /// Distinguishes repeated attempts at the same task.
  pub attempt_id: Uuid,
  pub completed_at: DateTime<Utc>,
  pub result: ExecutionResult,
}

impl ProofArtifact {
  pub fn new(task_id: u64, task_description: impl Into<String>, result: ExecutionResult) -> Self {
    Self {
      task_id,
      task_description: task_description.into(),
      attempt_id: Uuid::new_v4(),
      completed_at: Utc::now(),
      result,
    }
  }

  pub fn to_json(&self) -> Result<String, PublishError> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}
