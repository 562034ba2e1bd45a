//! Failure taxonomy of the translation collaborator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
  #[error("network failure: {0}")]
  Network(String),
  #[error("translation request timed out")]
  Timeout,
  #[error("rate limited by the translation service")]
  RateLimited,
  #[error("translation service returned status {0}")]
  Status(u16),
  #[error("invalid or empty translation result")]
  InvalidResponse,
  #[error("all translation attempts failed")]
  Exhausted {
    #[source]
    last: Option<Box<TranslationError>>,
  },
}

impl TranslationError {
  /// Transient failures are worth another attempt: connectivity problems,
  /// timeouts, rate limiting and server-side errors. Client errors other
  /// than 429 are permanent.
  pub fn is_retryable(&self) -> bool {
    match self {
      Self::Network(_) | Self::Timeout | Self::RateLimited | Self::InvalidResponse => true,
      Self::Status(status) => *status >= 500,
      Self::Exhausted { .. } => false,
    }
  }
}

impl From<reqwest::Error> for TranslationError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      return Self::Timeout;
    }
    match err.status() {
      Some(status) if status.as_u16() == 429 => Self::RateLimited,
      Some(status) => Self::Status(status.as_u16()),
      None => Self::Network(err.to_string()),
    }
  }
}
