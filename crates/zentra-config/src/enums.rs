use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of execution categories a task can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
  WebScraping,
  DataAnalysis,
  ContentSummary,
  Research,
}

impl TaskCategory {
  /// All categories, in keyword-matching priority order.
  pub const ALL: [TaskCategory; 4] = [
    TaskCategory::WebScraping,
    TaskCategory::DataAnalysis,
    TaskCategory::ContentSummary,
    TaskCategory::Research,
  ];

  /// The wire/tag name, e.g. `web_scraping`.
  pub fn as_str(&self) -> &'static str {
    match self {
      TaskCategory::WebScraping => "web_scraping",
      TaskCategory::DataAnalysis => "data_analysis",
      TaskCategory::ContentSummary => "content_summary",
      TaskCategory::Research => "research",
    }
  }
}

impl fmt::Display for TaskCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TaskCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    TaskCategory::ALL
      .into_iter()
      .find(|c| c.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("unknown task category: {}", s))
  }
}

/// Whether the worker accepts every task it can classify, or only those
/// classified above a confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptancePolicy {
  #[default]
  AcceptAll,
  MinConfidence,
}
