//! # Retry Policy
//!
//! Bounded retry with exponential backoff around gateway calls.
//! Only errors that [`PaymentError::is_retryable`] reports as transient are
//! retried; rejections are returned on the first attempt.

use pay_core::{PaymentError, PaymentResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry configuration for one gateway operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// One retry after `backoff`
    pub fn single_retry(backoff: Duration) -> Self {
        Self {
            max_retries: 1,
            initial_backoff: backoff,
            max_backoff: Duration::from_secs(5),
        }
    }

    /// Never retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Builder: set the number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before retry number `retry` (0-based), doubling each time.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `operation`, retrying transient failures.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> PaymentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PaymentResult<T>>,
    {
        let mut retry = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry < self.max_retries => {
                    let delay = self.backoff_for(retry);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        operation,
                        retry + 1,
                        self.max_retries + 1,
                        delay,
                        err
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(log_final(operation, err)),
            }
        }
    }
}

fn log_final(operation: &str, err: PaymentError) -> PaymentError {
    if err.is_retryable() {
        warn!("{} giving up: {}", operation, err);
    }
    err
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_retry(Duration::from_millis(500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> PaymentError {
        PaymentError::UpstreamAuth {
            status: Some(503),
            message: "unavailable".into(),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(3),
        };

        assert_eq!(policy.backoff_for(0), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(3));
        assert_eq!(policy.backoff_for(40), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_retried_once() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::single_retry(Duration::from_millis(200));

        let result = policy
            .run("token fetch", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(transient())
                } else {
                    Ok("token")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "token");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::single_retry(Duration::from_millis(200));

        let result: PaymentResult<()> = policy
            .run("token fetch", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy::single_retry(Duration::from_millis(200));

        let result: PaymentResult<()> = policy
            .run("stk push", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(PaymentError::UpstreamPayment {
                    status: Some(400),
                    message: "Invalid PhoneNumber".into(),
                })
            })
            .await;

        assert!(matches!(
            result,
            Err(PaymentError::UpstreamPayment { status: Some(400), .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
