//! Markup-to-text, link and metadata extraction.
//!
//! These are deliberately regex based: pages are scraped for grounding text,
//! not rendered, and malformed markup must never be an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Maximum number of links returned by [`extract_links`].
pub const MAX_LINKS: usize = 30;

static SCRIPT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?is)<a[^>]+href=["']([^"']+)["'][^>]*>(.*?)</a>"#).expect("valid regex")
});
static TITLE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static DESCRIPTION_NAME_FIRST: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)<meta[^>]+name=["']description["'][^>]+content=["']([^"']+)["']"#)
    .expect("valid regex")
});
static DESCRIPTION_CONTENT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)<meta[^>]+content=["']([^"']+)["'][^>]+name=["']description["']"#)
    .expect("valid regex")
});

/// An anchor found in a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
  pub url: String,
  pub text: String,
}

/// Title and description metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// Strip scripts, styles and tags, decode common entities, and collapse
/// whitespace.
pub fn extract_text(html: &str) -> String {
  let text = SCRIPT.replace_all(html, "");
  let text = STYLE.replace_all(&text, "");
  let text = TAG.replace_all(&text, " ");
  let text = decode_entities(&text);
  WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Collect up to [`MAX_LINKS`] anchors with visible text.
///
/// Fragment-only and `javascript:` links are skipped; relative links are
/// resolved against `base`.
pub fn extract_links(html: &str, base: &Url) -> Vec<Link> {
  ANCHOR
    .captures_iter(html)
    .filter_map(|caps| {
      let href = caps.get(1)?.as_str().trim();
      let text = TAG.replace_all(caps.get(2)?.as_str(), "");
      let text = WHITESPACE.replace_all(&text, " ").trim().to_string();

      if href.is_empty() || href.starts_with('#') || href.starts_with("javascript") || text.is_empty()
      {
        return None;
      }

      let url = if href.starts_with("http") {
        href.to_string()
      } else {
        base.join(href).ok()?.to_string()
      };

      Some(Link { url, text })
    })
    .take(MAX_LINKS)
    .collect()
}

/// Extract the `<title>` and description meta tag, if present.
pub fn extract_meta(html: &str) -> PageMeta {
  let title = TITLE
    .captures(html)
    .and_then(|caps| caps.get(1))
    .map(|m| TAG.replace_all(m.as_str(), "").trim().to_string())
    .filter(|t| !t.is_empty());

  let description = DESCRIPTION_NAME_FIRST
    .captures(html)
    .or_else(|| DESCRIPTION_CONTENT_FIRST.captures(html))
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().to_string());

  PageMeta { title, description }
}

/// The first `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
  match text.char_indices().nth(max_chars) {
    Some((idx, _)) => &text[..idx],
    None => text,
  }
}

fn decode_entities(text: &str) -> String {
  text
    .replace("&nbsp;", " ")
    .replace("&amp;", "&")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
}
