//! Retry wrapper around a completer

use std::time::Duration;
use async_trait::async_trait;
use log::{debug, info};

use crate::client::Completer;
use crate::CompletionResult;

/// Retry policy for failed requests
#[derive(Debug, Clone)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub backoff_multiplier: f32
  , pub initial_backoff: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_retries: usize
    , backoff_multiplier: f32
    , initial_backoff_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , backoff_multiplier
          , initial_backoff: Duration::from_millis(
              initial_backoff_ms
            )
        }
    }

    /// Calculate backoff duration for attempt number
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   debug!("Calculating backoff for attempt {}", attempt);
        let multiplier
          = self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(
          (self.initial_backoff.as_millis() as f32
            * multiplier) as u64
        )
    }

    /// Whether `result` should be tried again
    pub fn should_retry(&self, result: &CompletionResult) -> bool
    {   result.failure_kind()
          .map(|kind| kind.is_transient())
          .unwrap_or(false)
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::from(&crate::config::RetryConfig::default())
    }
}

impl From<&crate::config::RetryConfig> for RetryPolicy
{   fn from(config: &crate::config::RetryConfig) -> Self
    {   RetryPolicy::new(
          config.max_retries
        , config.backoff_multiplier
        , config.initial_backoff_ms
        )
    }
}

/// Completer that retries transient failures of an inner completer.
///
/// Gives up after `max_retries` extra attempts and returns the last
/// result unchanged.
pub struct RetryingCompleter<C>
{   inner: C
  , policy: RetryPolicy
}

impl<C> RetryingCompleter<C>
where
  C: Completer
{   pub fn new(inner: C, policy: RetryPolicy) -> Self
    {   RetryingCompleter { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy
    {   &self.policy
    }

    pub fn into_inner(self) -> C
    {   self.inner
    }
}

#[async_trait]
impl<C> Completer for RetryingCompleter<C>
where
  C: Completer
{   async fn complete(&self, prompt: &str) -> CompletionResult
    {   let mut attempt = 0;
        loop
        {   let result = self.inner.complete(prompt).await;
            if attempt >= self.policy.max_retries
              || !self.policy.should_retry(&result)
            {   return result;
            }

            let backoff = self.policy.backoff_for_attempt(attempt);
            info!(
              "Attempt {} failed ({}), retrying in {:?}",
              attempt + 1,
              result.failure_kind()
                .map(|k| k.to_string())
                .unwrap_or_default(),
              backoff
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }
}
