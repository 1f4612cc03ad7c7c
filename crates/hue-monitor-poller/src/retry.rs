//! Bounded retry with a fixed delay.

use hue_monitor_adapter_http::{Transport, TransportError};
use std::future::Future;
use std::time::Duration;

/// Retry policy for transport calls.
///
/// An operation is attempted up to `max_attempts` times with `delay`
/// between attempts. Only retryable [`TransportError`]s trigger another
/// attempt; the policy keeps no state between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Policy used for individual light detail requests.
    pub const DETAIL: RetryPolicy = RetryPolicy {
        max_attempts: 3,
        delay: Duration::from_millis(100),
    };

    /// Create a policy. A `max_attempts` of zero is treated as one.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Total number of attempts, including the first.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` until it succeeds or the attempts are used up.
    ///
    /// `target` names what is being reached and is used for logging and
    /// for the returned error.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] carrying the last failure once every attempt
    /// has failed, or immediately on a non-retryable failure.
    pub async fn run<T, F, Fut>(&self, target: &str, mut operation: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(url = target, attempt, "Connection re-established");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    tracing::warn!(
                        url = target,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "Request failed"
                    );

                    if !error.is_retryable() || attempt >= self.max_attempts {
                        return Err(RetryError {
                            url: target.to_string(),
                            attempts: attempt,
                            last: error,
                        });
                    }
                }
            }

            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }

    /// GET `url` through `transport` under this policy.
    ///
    /// # Errors
    ///
    /// See [`RetryPolicy::run`].
    pub async fn get<T: Transport>(&self, transport: &T, url: &str) -> Result<String, RetryError> {
        self.run(url, || transport.get(url)).await
    }
}

/// All attempts to reach a URL failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{url} unreachable after {attempts} attempt(s): {last}")]
pub struct RetryError {
    /// URL that could not be reached
    pub url: String,
    /// Number of attempts made
    pub attempts: u32,
    /// Failure from the final attempt
    #[source]
    pub last: TransportError,
}
