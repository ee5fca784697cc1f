// storefront_client/src/api/retry.rs

//! Bounded exponential backoff for transient failures.

use crate::error::StorefrontResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
  /// Total attempts, including the first one.
  pub max_attempts: u32,
  pub base_delay: Duration,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_delay: Duration::from_millis(1000),
    }
  }
}

impl RetryConfig {
  /// Delay before the retry that follows failed attempt `attempt` (0-based):
  /// `base_delay * 2^attempt`.
  pub fn delay_for(&self, attempt: u32) -> Duration {
    self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
  }
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or
/// `max_attempts` is reached. Only [`StorefrontError::is_transient`] errors are retried.
///
/// [`StorefrontError::is_transient`]: crate::error::StorefrontError::is_transient
pub async fn with_backoff<F, Fut, T>(config: &RetryConfig, mut operation: F) -> StorefrontResult<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = StorefrontResult<T>>,
{
  let max_attempts = config.max_attempts.max(1);
  let mut attempt = 0;
  loop {
    match operation().await {
      Ok(value) => {
        if attempt > 0 {
          debug!(attempts = attempt + 1, "Operation succeeded after retrying.");
        }
        return Ok(value);
      }
      Err(err) if err.is_transient() && attempt + 1 < max_attempts => {
        let delay = config.delay_for(attempt);
        warn!(attempt = attempt + 1, error = %err, ?delay, "Transient failure, retrying.");
        sleep(delay).await;
        attempt += 1;
      }
      Err(err) => return Err(err),
    }
  }
}
