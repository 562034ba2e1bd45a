//! HTTP client for the translation proxy.
//!
//! Talks to the backend proxy (which holds the API key) using the DeepL wire
//! shape, and implements the core's [`Translator`] seam with the retry
//! policy wrapped around every call.

use std::time::Duration;

use serde::{
  Deserialize,
  Serialize,
};
use tagtree_lib::convert::{
  Lang,
  Translator,
};

use crate::{
  error::TranslationError,
  retry::{
    RetryPolicy,
    with_retry,
  },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
  text:        Vec<&'a str>,
  source_lang: &'a str,
  target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
  translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
  text: String,
}

impl TranslateResponse {
  /// First non-blank translation, or `InvalidResponse`.
  fn into_text(self) -> Result<String, TranslationError> {
    self
      .translations
      .into_iter()
      .map(|t| t.text)
      .find(|text| !text.trim().is_empty())
      .ok_or(TranslationError::InvalidResponse)
  }
}

/// Async client for the `/api/translate` proxy endpoint.
pub struct DeeplProxyClient {
  http:     reqwest::Client,
  endpoint: String,
  policy:   RetryPolicy,
}

impl DeeplProxyClient {
  pub fn new(endpoint: impl Into<String>) -> Result<Self, TranslationError> {
    Self::with_policy(endpoint, RetryPolicy::default())
  }

  pub fn with_policy(
    endpoint: impl Into<String>,
    policy: RetryPolicy,
  ) -> Result<Self, TranslationError> {
    let http = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(TranslationError::from)?;
    Ok(Self {
      http,
      endpoint: endpoint.into(),
      policy,
    })
  }

  async fn request(&self, text: &str, source: Lang, target: Lang) -> Result<String, TranslationError> {
    let payload = TranslateRequest {
      text:        vec![text],
      source_lang: source.code(),
      target_lang: target.code(),
    };
    let response = self
      .http
      .post(&self.endpoint)
      .json(&payload)
      .send()
      .await?;

    let status = response.status();
    if status.as_u16() == 429 {
      return Err(TranslationError::RateLimited);
    }
    if !status.is_success() {
      return Err(TranslationError::Status(status.as_u16()));
    }

    let body: TranslateResponse = response
      .json()
      .await
      .map_err(|_| TranslationError::InvalidResponse)?;
    body.into_text()
  }
}

#[async_trait::async_trait]
impl Translator for DeeplProxyClient {
  async fn translate(
    &self,
    text: &str,
    source: Lang,
    target: Lang,
  ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let translated = with_retry(&self.policy, || self.request(text, source, target)).await?;
    tracing::debug!(input = %text, output = %translated, "translated");
    Ok(translated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn request_payload_matches_the_wire_shape() {
    let payload = TranslateRequest {
      text:        vec!["笑顔"],
      source_lang: Lang::Ja.code(),
      target_lang: Lang::En.code(),
    };
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "text": ["笑顔"],
        "source_lang": "JA",
        "target_lang": "EN",
      })
    );
  }

  #[test]
  fn response_takes_the_first_non_blank_translation() {
    let body: TranslateResponse =
      serde_json::from_str(r#"{"translations":[{"text":"  "},{"text":"smile"}]}"#).unwrap();
    assert_eq!(body.into_text().unwrap(), "smile");
  }

  #[test]
  fn blank_only_responses_are_invalid() {
    let body: TranslateResponse =
      serde_json::from_str(r#"{"translations":[{"text":""}]}"#).unwrap();
    assert!(matches!(
      body.into_text(),
      Err(TranslationError::InvalidResponse)
    ));
  }
}
