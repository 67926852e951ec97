use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, LOCATION};
use reqwest::{Client, redirect};
use tracing::{debug, info, warn};
use url::Url;
use zentra_config::FetchConfig;

use crate::error::FetchError;

/// A fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
  /// Final URL after redirects.
  pub url: String,
  pub status: u16,
  /// Raw response body.
  pub body: String,
}

/// Something that can retrieve a document by URL.
#[async_trait]
pub trait Fetch: Send + Sync {
  async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

/// HTTP(S) fetcher with a bounded deadline and manual redirect handling.
pub struct HttpFetcher {
  client: Client,
  config: FetchConfig,
}

impl HttpFetcher {
  pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
      ACCEPT,
      HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    let client = Client::builder()
      .user_agent(config.user_agent.clone())
      .default_headers(headers)
      .redirect(redirect::Policy::none())
      .timeout(config.timeout())
      .build()?;

    Ok(Self { client, config })
  }

  /// Fetch `url`, following up to `max_redirects` hops.
  async fn fetch_following(&self, url: &str) -> Result<Page, FetchError> {
    let mut current = parse_http_url(url)?;

    for hop in 0..=self.config.max_redirects {
      let response = self.client.get(current.clone()).send().await?;
      let status = response.status();

      if status.is_redirection() {
        let location = response
          .headers()
          .get(LOCATION)
          .and_then(|v| v.to_str().ok());

        if let Some(location) = location {
          let next = current.join(location).map_err(|e| FetchError::InvalidUrl {
            url: location.to_string(),
            message: e.to_string(),
          })?;
          debug!(hop, from = %current, to = %next, "following redirect");
          current = parse_http_url(next.as_str())?;
          continue;
        }
      }

      let body = response.text().await?;
      return Ok(Page {
        url: current.to_string(),
        status: status.as_u16(),
        body,
      });
    }

    Err(FetchError::TooManyRedirects {
      url: url.to_string(),
      max_redirects: self.config.max_redirects,
    })
  }
}

#[async_trait]
impl Fetch for HttpFetcher {
  async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
    let result = tokio::time::timeout(self.config.timeout(), self.fetch_following(url))
      .await
      .unwrap_or(Err(FetchError::Timeout {
        timeout_ms: self.config.timeout_ms,
      }));

    match &result {
      Ok(page) => info!(url, status = page.status, bytes = page.body.len(), "fetched"),
      Err(e) => warn!(url, error = %e, "fetch failed"),
    }

    result
  }
}

fn parse_http_url(url: &str) -> Result<Url, FetchError> {
  let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
    url: url.to_string(),
    message: e.to_string(),
  })?;

  match parsed.scheme() {
    "http" | "https" => Ok(parsed),
    other => Err(FetchError::UnsupportedScheme {
      scheme: other.to_string(),
    }),
  }
}
