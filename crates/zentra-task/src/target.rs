//! Target URL derivation from free-text descriptions.

use std::sync::LazyLock;

use regex::Regex;

static EXPLICIT_URL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("valid regex"));

static SUBREDDIT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"r/([a-z0-9_]+)").expect("valid regex"));

/// The first `http(s)://` URL appearing in the text.
pub fn find_url(description: &str) -> Option<String> {
  EXPLICIT_URL
    .find(description)
    .map(|m| m.as_str().to_string())
}

/// An explicit URL if present, otherwise a well-known site the description
/// mentions by name.
pub fn infer_url(description: &str) -> Option<String> {
  if let Some(url) = find_url(description) {
    return Some(url);
  }

  let lower = description.to_lowercase();
  let has = |needle: &str| lower.contains(needle);

  let url = if has("amazon") && has("electronic") {
    "https://www.amazon.com/s?k=electronics&s=review-rank".to_string()
  } else if has("amazon") {
    "https://www.amazon.com/bestsellers".to_string()
  } else if has("hacker news") || has("hackernews") {
    "https://news.ycombinator.com".to_string()
  } else if has("github trending") {
    "https://github.com/trending".to_string()
  } else if has("producthunt") {
    "https://www.producthunt.com".to_string()
  } else if has("reddit") {
    match SUBREDDIT.captures(&lower) {
      Some(captures) => format!("https://www.reddit.com/r/{}", &captures[1]),
      None => "https://www.reddit.com/r/technology".to_string(),
    }
  } else if has("coinmarketcap") || has("crypto price") {
    "https://coinmarketcap.com".to_string()
  } else if has("monad") && has("explorer") {
    "https://testnet.monadvision.com".to_string()
  } else {
    return None;
  };

  Some(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_explicit_url_wins() {
    assert_eq!(
      infer_url("Get top 5 headlines from https://example.com/news on amazon").as_deref(),
      Some("https://example.com/news")
    );
  }

  #[test]
  fn test_url_stops_at_quote() {
    assert_eq!(
      find_url(r#"see "https://example.com/a" please"#).as_deref(),
      Some("https://example.com/a")
    );
  }

  #[test]
  fn test_known_sites() {
    let cases = [
      ("best amazon electronics", "https://www.amazon.com/s?k=electronics&s=review-rank"),
      ("amazon deals", "https://www.amazon.com/bestsellers"),
      ("Hacker News front page", "https://news.ycombinator.com"),
      ("github trending repos", "https://github.com/trending"),
      ("reddit r/rust top posts", "https://www.reddit.com/r/rust"),
      ("what is reddit saying", "https://www.reddit.com/r/technology"),
      ("crypto prices today", "https://coinmarketcap.com"),
      ("check the monad explorer", "https://testnet.monadvision.com"),
    ];

    for (description, expected) in cases {
      assert_eq!(infer_url(description).as_deref(), Some(expected), "{}", description);
    }
  }

  #[test]
  fn test_no_target() {
    assert_eq!(infer_url("Write a poem about the sea"), None);
    assert_eq!(find_url("amazon bestsellers"), None);
  }
}
