//! AnthropicExtractor against a local mock server.

use mockito::Matcher;
use zentra_config::ExtractionConfig;
use zentra_extract::{AnthropicExtractor, ExtractionRequest, Extractor, Outcome};

fn extractor(endpoint: String) -> AnthropicExtractor {
  AnthropicExtractor::new(ExtractionConfig {
    endpoint,
    api_key: Some("test-key".to_string()),
    timeout_ms: 5_000,
    ..ExtractionConfig::default()
  })
  .expect("failed to build extractor")
}

fn request() -> ExtractionRequest {
  ExtractionRequest {
    prompt: "Return ONLY JSON".to_string(),
    max_tokens: 4000,
  }
}

#[tokio::test]
async fn test_extract_parses_fenced_reply() {
  let mut server = mockito::Server::new_async().await;
  let mock = server
    .mock("POST", "/v1/messages")
    .match_header("x-api-key", "test-key")
    .match_header("anthropic-version", "2023-06-01")
    .match_body(Matcher::PartialJson(serde_json::json!({
      "max_tokens": 4000,
      "messages": [{ "role": "user", "content": "Return ONLY JSON" }]
    })))
    .with_status(200)
    .with_body(
      serde_json::json!({
        "content": [{ "type": "text", "text": "```json\n{\"taskType\": \"research\"}\n```" }]
      })
      .to_string(),
    )
    .create_async()
    .await;

  let outcome = extractor(server.url()).extract(request()).await;

  assert_eq!(
    outcome,
    Outcome::Ok(serde_json::json!({ "taskType": "research" }))
  );
  mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_failure() {
  let mut server = mockito::Server::new_async().await;
  server
    .mock("POST", "/v1/messages")
    .with_status(529)
    .with_body("overloaded")
    .create_async()
    .await;

  let outcome = extractor(server.url()).extract(request()).await;

  assert!(matches!(outcome, Outcome::Failed(reason) if reason.contains("529")));
}

#[tokio::test]
async fn test_prose_reply_is_degraded() {
  let mut server = mockito::Server::new_async().await;
  server
    .mock("POST", "/v1/messages")
    .with_status(200)
    .with_body(r#"{"content": [{"type": "text", "text": "I cannot help with that."}]}"#)
    .create_async()
    .await;

  let outcome = extractor(server.url()).extract(request()).await;

  assert!(matches!(outcome, Outcome::Degraded(_)));
}

#[tokio::test]
async fn test_empty_content_is_degraded() {
  let mut server = mockito::Server::new_async().await;
  server
    .mock("POST", "/v1/messages")
    .with_status(200)
    .with_body(r#"{"content": []}"#)
    .create_async()
    .await;

  let outcome = extractor(server.url()).extract(request()).await;

  assert!(matches!(outcome, Outcome::Degraded(_)));
}
