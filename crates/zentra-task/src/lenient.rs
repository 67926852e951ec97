//! Forgiving field decoders for extraction replies.
//!
//! The extraction service answers in loosely typed JSON: a field may come
//! back `null`, a number may arrive as `"5 minutes"`, a list may be a single
//! string. Each decoder here accepts any JSON value and maps what it cannot
//! use to the field's empty value, so one odd field never discards a reply.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn scalar_text(value: Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Null | Value::Array(_) | Value::Object(_) => None,
  }
}

/// Leading number of a string such as `"5 minutes"` or `"~12.5"`.
fn leading_number(s: &str) -> Option<f64> {
  let trimmed = s.trim().trim_start_matches('~');
  let end = trimmed
    .char_indices()
    .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
    .map(|(i, _)| i)
    .unwrap_or(trimmed.len());
  trimmed[..end].parse().ok()
}

fn number(value: Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => leading_number(&s),
    _ => None,
  }
}

pub(crate) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn opt_string<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<String>, D::Error> {
  Ok(scalar_text(Value::deserialize(deserializer)?).filter(|s| !s.trim().is_empty()))
}

pub(crate) fn opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
  Ok(number(Value::deserialize(deserializer)?).filter(|n| n.is_finite()))
}

pub(crate) fn opt_usize<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<usize>, D::Error> {
  Ok(
    number(Value::deserialize(deserializer)?)
      .filter(|n| n.is_finite() && *n >= 0.0)
      .map(|n| n.round() as usize),
  )
}

/// A list of strings. A lone string becomes a one-item list; non-scalar
/// items are dropped.
pub(crate) fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
  Ok(match Value::deserialize(deserializer)? {
    Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
    Value::String(s) if !s.trim().is_empty() => vec![s],
    _ => Vec::new(),
  })
}

/// A list of `T`. Items that do not decode are dropped.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Array(items) => items
      .into_iter()
      .filter_map(|item| serde_json::from_value(item).ok())
      .collect(),
    _ => Vec::new(),
  })
}

/// Raw JSON items. A lone value becomes a one-item list.
pub(crate) fn values<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
  Ok(match Value::deserialize(deserializer)? {
    Value::Array(items) => items,
    Value::Null => Vec::new(),
    other => vec![other],
  })
}

/// Any `T`, or its default when the value does not decode.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned + Default,
{
  Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

#[cfg(test)]
mod tests {
  use serde::Deserialize;
  use serde_json::json;

  #[derive(Debug, Default, Deserialize)]
  #[serde(default, rename_all = "camelCase")]
  struct Reply {
    #[serde(deserialize_with = "super::string")]
    summary: String,
    #[serde(deserialize_with = "super::opt_f64")]
    reading_time_minutes: Option<f64>,
    #[serde(deserialize_with = "super::opt_usize")]
    item_count: Option<usize>,
    #[serde(deserialize_with = "super::strings")]
    key_points: Vec<String>,
  }

  #[test]
  fn test_nulls_become_empty() {
    let reply: Reply = serde_json::from_value(json!({
      "summary": null,
      "readingTimeMinutes": null,
      "itemCount": null,
      "keyPoints": null
    }))
    .unwrap();

    assert_eq!(reply.summary, "");
    assert_eq!(reply.reading_time_minutes, None);
    assert_eq!(reply.item_count, None);
    assert!(reply.key_points.is_empty());
  }

  #[test]
  fn test_numbers_inside_strings() {
    let reply: Reply = serde_json::from_value(json!({
      "readingTimeMinutes": "5 minutes",
      "itemCount": "12",
      "summary": 42
    }))
    .unwrap();

    assert_eq!(reply.reading_time_minutes, Some(5.0));
    assert_eq!(reply.item_count, Some(12));
    assert_eq!(reply.summary, "42");
  }

  #[test]
  fn test_unusable_values_are_dropped() {
    let reply: Reply = serde_json::from_value(json!({
      "itemCount": "?",
      "keyPoints": ["one", null, { "nested": true }, 2]
    }))
    .unwrap();

    assert_eq!(reply.item_count, None);
    assert_eq!(reply.key_points, vec!["one", "2"]);
  }

  #[test]
  fn test_single_string_becomes_list() {
    let reply: Reply = serde_json::from_value(json!({ "keyPoints": "only point" })).unwrap();
    assert_eq!(reply.key_points, vec!["only point"]);
  }
}
