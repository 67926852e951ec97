//! Keyword and tag based task classification.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zentra_config::TaskCategory;

/// Confidence assigned when the description carries a recognized category tag.
pub const TAG_CONFIDENCE: f64 = 1.0;

/// Confidence assigned on a keyword hit.
pub const KEYWORD_CONFIDENCE: f64 = 0.85;

/// Confidence of the research fallback.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

static CATEGORY_TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\[CATEGORY:(\w+)\]").expect("valid regex"));

static CATEGORY_TAG_WITH_SPACE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\[CATEGORY:\w+\]\s*").expect("valid regex"));

const RETRIEVAL_KEYWORDS: &[&str] = &[
  "scrape",
  "crawl",
  "extract",
  "fetch",
  "amazon",
  "products",
  "headlines",
  "website",
  "url",
  "prices",
  "listings",
  "articles",
  "ebay",
  "reddit",
  "github",
  "hacker news",
];

const ANALYSIS_KEYWORDS: &[&str] = &[
  "analyze",
  "analysis",
  "data",
  "csv",
  "statistics",
  "trends",
  "report",
  "average",
  "count",
  "total",
  "monad",
  "blockchain",
  "transactions",
  "blocks",
  "calculate",
  "percentage",
  "median",
];

const SUMMARY_KEYWORDS: &[&str] = &[
  "summarize",
  "summary",
  "brief",
  "overview",
  "tldr",
  "key points",
  "main points",
  "explain",
  "describe",
  "digest",
];

const RESEARCH_KEYWORDS: &[&str] = &[
  "research",
  "find",
  "search",
  "investigate",
  "compare",
  "top",
  "best",
  "list",
  "who is",
  "what is",
  "how does",
  "pros and cons",
  "difference between",
  "recommend",
  "suggest",
  "alternatives",
  "competing",
  "threat",
  "layer 1",
  "blockchain platforms",
];

/// The category a description was routed to, and how sure the classifier is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
  pub category: TaskCategory,
  pub confidence: f64,
}

fn keywords(category: TaskCategory) -> &'static [&'static str] {
  match category {
    TaskCategory::WebScraping => RETRIEVAL_KEYWORDS,
    TaskCategory::DataAnalysis => ANALYSIS_KEYWORDS,
    TaskCategory::ContentSummary => SUMMARY_KEYWORDS,
    TaskCategory::Research => RESEARCH_KEYWORDS,
  }
}

/// Classify a task description. Never fails: anything unrecognized is research.
///
/// An explicit `[CATEGORY:<name>]` tag naming a known category wins outright.
/// Otherwise categories are tried in [`TaskCategory::ALL`] order and the first
/// one with a keyword hit is chosen.
pub fn classify(description: &str) -> Classification {
  if let Some(captures) = CATEGORY_TAG.captures(description)
    && let Ok(category) = captures[1].parse::<TaskCategory>()
  {
    return Classification {
      category,
      confidence: TAG_CONFIDENCE,
    };
  }

  let lower = description.to_lowercase();
  TaskCategory::ALL
    .into_iter()
    .find(|category| keywords(*category).iter().any(|k| lower.contains(k)))
    .map(|category| Classification {
      category,
      confidence: KEYWORD_CONFIDENCE,
    })
    .unwrap_or(Classification {
      category: TaskCategory::Research,
      confidence: DEFAULT_CONFIDENCE,
    })
}

/// Remove the first category tag (and the whitespace after it).
pub fn strip_category_tag(description: &str) -> String {
  CATEGORY_TAG_WITH_SPACE
    .replace(description, "")
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tag_wins_over_keywords() {
    let c = classify("[CATEGORY:content_summary] scrape the amazon bestsellers");
    assert_eq!(c.category, TaskCategory::ContentSummary);
    assert_eq!(c.confidence, 1.0);
  }

  #[test]
  fn test_tag_is_case_insensitive() {
    let c = classify("[category:DATA_ANALYSIS] anything");
    assert_eq!(c.category, TaskCategory::DataAnalysis);
    assert_eq!(c.confidence, 1.0);
  }

  #[test]
  fn test_unknown_tag_falls_through_to_keywords() {
    let c = classify("[CATEGORY:painting] summarize this essay");
    assert_eq!(c.category, TaskCategory::ContentSummary);
    assert_eq!(c.confidence, 0.85);
  }

  #[test]
  fn test_keyword_priority_order() {
    // "fetch" (retrieval) and "average" (analysis) both hit; retrieval is tried first.
    let c = classify("fetch the page and compute the average");
    assert_eq!(c.category, TaskCategory::WebScraping);
    assert_eq!(c.confidence, 0.85);
  }

  #[test]
  fn test_multi_word_keyword() {
    let c = classify("What are the pros and cons of rollups?");
    assert_eq!(c.category, TaskCategory::Research);
    assert_eq!(c.confidence, 0.85);
  }

  #[test]
  fn test_no_keywords_defaults_to_research() {
    let c = classify("Write me a haiku about autumn");
    assert_eq!(c.category, TaskCategory::Research);
    assert_eq!(c.confidence, 0.7);
  }

  #[test]
  fn test_empty_description() {
    let c = classify("");
    assert_eq!(c.category, TaskCategory::Research);
    assert_eq!(c.confidence, 0.7);
  }

  #[test]
  fn test_strip_category_tag() {
    assert_eq!(
      strip_category_tag("[CATEGORY:web_scraping]   Get headlines from https://example.com/news"),
      "Get headlines from https://example.com/news"
    );
    assert_eq!(strip_category_tag("  no tag here "), "no tag here");
  }

  #[test]
  fn test_strip_only_first_tag() {
    assert_eq!(
      strip_category_tag("[CATEGORY:research] a [CATEGORY:research] b"),
      "a [CATEGORY:research] b"
    );
  }
}
