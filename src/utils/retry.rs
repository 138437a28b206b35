use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(60))
    }
}

/// Run `op` until it succeeds, the error is not retryable, or the policy is exhausted.
pub async fn retry_with<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &str,
    should_retry: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let attempts = policy.max_attempts();

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}/{}", operation, attempt, attempts);
                }
                return Ok(value);
            }
            Err(e) => {
                if attempt >= attempts || !should_retry(&e) {
                    return Err(e);
                }

                tracing::warn!(
                    "{} attempt {}/{} failed: {}, retrying in {:?}",
                    operation,
                    attempt,
                    attempts,
                    e,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }

    unreachable!("retry loop always returns from its last attempt")
}
