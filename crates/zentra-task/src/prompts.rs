//! Extraction prompts, rendered with minijinja.
//!
//! Each strategy has one template. The context is whatever the strategy
//! gathered; absent values render as empty and the templates branch on them.

use minijinja::Environment;
use serde::Serialize;

use crate::error::TaskError;

pub const RETRIEVAL: &str = r#"You are a precise web scraping agent. The user requested:
"{{ description }}"

I fetched this page: {{ url }}
Page title: {{ title or "Unknown" }}
Raw text content (first {{ limit }} chars):
---
{{ text }}
---

Extract exactly what the user asked for. Return ONLY a valid JSON object:
{
  "summary": "2-3 sentence description of what was found",
  "pageTitle": "{{ title }}",
  "data": [ ... array of extracted items as objects with relevant fields ... ],
  "itemCount": number
}

Be specific. If asked for products, extract product names, prices, ratings.
If asked for headlines, extract titles and URLs.
If asked for listings, extract all relevant fields.
Return ONLY JSON, no markdown, no explanation."#;

pub const ANALYSIS: &str = r#"You are a data analyst. The user requested:
"{{ description }}"

{% if context %}Here is the real data I gathered:
{{ context }}{% else %}No external data source detected - use your knowledge to answer.{% endif %}

Perform the analysis and return ONLY a valid JSON object:
{
  "summary": "clear 2-4 sentence answer to the user's question",
  "methodology": "brief explanation of how you calculated/analyzed",
  "findings": [
    { "metric": "name", "value": "result", "unit": "optional unit", "insight": "what this means" }
  ],
  "rawData": { ... any supporting data or calculations ... },
  "dataSource": "where the data came from"
}

Be precise with numbers. Show your work in findings.
Return ONLY JSON, no markdown, no explanation."#;

pub const SUMMARY: &str = r#"You are a content summarization agent. The user requested:
"{{ description }}"

Source: {{ source }}
Content to summarize:
---
{{ content }}
---

Create a comprehensive summary and return ONLY a valid JSON object:
{
  "tldr": "one sentence summary",
  "summary": "3-5 paragraph detailed summary",
  "keyPoints": ["key point 1", "key point 2", "key point 3"],
  "mainTopics": ["topic1", "topic2"],
  "sentiment": "positive/negative/neutral/mixed",
  "readingTimeMinutes": estimated reading time of original
}

Be thorough. Key points should be actionable insights.
Return ONLY JSON, no markdown, no explanation."#;

pub const RESEARCH: &str = r#"You are a thorough research agent. The user requested:
"{{ description }}"

{% if context %}I fetched this relevant page ({{ url }}):
---
{{ context }}
---
{% else %}No specific URL was provided - use your training knowledge to answer comprehensively.{% endif %}

Conduct the research and return ONLY a valid JSON object:
{
  "summary": "3-5 sentence executive summary answering the core question",
  "findings": [
    { "topic": "aspect of the research", "detail": "comprehensive finding", "confidence": "high/medium/low" }
  ],
  "recommendations": ["actionable recommendation 1", "actionable recommendation 2"],
  "prosAndCons": { "pros": ["pro1", "pro2"], "cons": ["con1", "con2"] },
  "topResults": [
    { "name": "item name", "description": "why it's relevant", "url": "if applicable" }
  ],
  "sources": ["{{ url or "training knowledge" }}"]
}

Be comprehensive. Back up findings with specifics.
Return ONLY JSON, no markdown, no explanation."#;

/// Render `template` against a serializable context.
pub fn render<S: Serialize>(
  name: &'static str,
  template: &str,
  context: S,
) -> Result<String, TaskError> {
  let env = Environment::new();
  env
    .render_str(template, context)
    .map_err(|e| TaskError::Template {
      template: name,
      message: e.to_string(),
    })
}
