//! Bounded exponential backoff around a translation attempt.

use std::{
  future::Future,
  time::Duration,
};

use crate::error::TranslationError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
  pub max_attempts:   u32,
  pub base_delay:     Duration,
  pub backoff_factor: u32,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts:   3,
      base_delay:     Duration::from_secs(1),
      backoff_factor: 2,
    }
  }
}

impl RetryPolicy {
  /// Delay slept before the given attempt (0-based). The first attempt runs
  /// immediately; later ones wait `base * factor^(attempt - 1)`.
  fn delay_before(&self, attempt: u32) -> Duration {
    if attempt == 0 {
      Duration::ZERO
    } else {
      self.base_delay * self.backoff_factor.saturating_pow(attempt - 1)
    }
  }
}

/// Runs `operation` up to `policy.max_attempts` times. Non-retryable errors
/// abort immediately; exhausting every attempt yields
/// [`TranslationError::Exhausted`] carrying the last failure.
pub async fn with_retry<T, F, Fut>(
  policy: &RetryPolicy,
  mut operation: F,
) -> Result<T, TranslationError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, TranslationError>>,
{
  let mut last = None;
  for attempt in 0..policy.max_attempts {
    let delay = policy.delay_before(attempt);
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
    if attempt > 0 {
      tracing::debug!(attempt = attempt + 1, max = policy.max_attempts, "retrying translation");
    }

    match operation().await {
      Ok(value) => return Ok(value),
      Err(err) if !err.is_retryable() => return Err(err),
      Err(err) => {
        tracing::warn!(attempt = attempt + 1, error = %err, "translation attempt failed");
        last = Some(err);
      },
    }
  }
  Err(TranslationError::Exhausted {
    last: last.map(Box::new),
  })
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{
    AtomicU32,
    Ordering,
  };

  use super::*;

  fn instant_policy() -> RetryPolicy {
    RetryPolicy {
      base_delay: Duration::ZERO,
      ..Default::default()
    }
  }

  #[test]
  fn backoff_doubles_per_attempt() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_before(0), Duration::ZERO);
    assert_eq!(policy.delay_before(1), Duration::from_secs(1));
    assert_eq!(policy.delay_before(2), Duration::from_secs(2));
  }

  #[tokio::test]
  async fn succeeds_on_a_later_attempt() {
    let calls = AtomicU32::new(0);
    let result = with_retry(&instant_policy(), || {
      let attempt = calls.fetch_add(1, Ordering::SeqCst);
      async move {
        if attempt < 1 {
          Err(TranslationError::Status(503))
        } else {
          Ok("翻訳".to_string())
        }
      }
    })
    .await;
    assert_eq!(result.unwrap(), "翻訳");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn non_retryable_client_error_aborts_immediately() {
    let calls = AtomicU32::new(0);
    let result: Result<String, _> = with_retry(&instant_policy(), || {
      calls.fetch_add(1, Ordering::SeqCst);
      async { Err(TranslationError::Status(400)) }
    })
    .await;
    assert!(matches!(result, Err(TranslationError::Status(400))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn rate_limiting_is_retried_until_exhausted() {
    let calls = AtomicU32::new(0);
    let result: Result<String, _> = with_retry(&instant_policy(), || {
      calls.fetch_add(1, Ordering::SeqCst);
      async { Err(TranslationError::RateLimited) }
    })
    .await;
    assert!(matches!(result, Err(TranslationError::Exhausted { last: Some(_) })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }
}
