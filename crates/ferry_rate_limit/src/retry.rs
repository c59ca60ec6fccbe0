//! Exponential backoff wrapper.

use ferry_core::{Deadline, RetryPolicy};
use ferry_error::RetryableError;
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Run `operation`, retrying transient failures with exponential backoff.
///
/// Permanent failures (see [`RetryableError::is_retryable`]) return at once.
/// After `policy.max_retries` retries the last error is returned.
///
/// # Example
///
/// ```rust,ignore
/// let url = with_retry(&policy, || transfer.transfer(&source, "articles")).await?;
/// ```
pub async fn with_retry<F, Fut, R, E>(policy: &RetryPolicy, operation: F) -> Result<R, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: RetryableError + std::fmt::Display,
{
    run(policy, None, operation).await
}

/// Like [`with_retry`], but no new attempt starts once `deadline` is exhausted.
///
/// The first attempt always runs; the caller decides whether to start work.
/// Backoff sleeps never outlast the remaining budget.
pub async fn with_retry_until<F, Fut, R, E>(
    policy: &RetryPolicy,
    deadline: &Deadline,
    operation: F,
) -> Result<R, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: RetryableError + std::fmt::Display,
{
    run(policy, Some(deadline), operation).await
}

async fn run<F, Fut, R, E>(
    policy: &RetryPolicy,
    deadline: Option<&Deadline>,
    mut operation: F,
) -> Result<R, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: RetryableError + std::fmt::Display,
{
    let strategy = ExponentialBackoff::from_millis(policy.initial_backoff_ms.max(1))
        .factor(policy.factor.max(1))
        .max_delay(Duration::from_secs(policy.max_delay_secs))
        .map(jitter)
        .map(move |delay| deadline.map_or(delay, |d| delay.min(d.remaining())))
        .take(policy.max_retries);

    let mut attempt = 0usize;
    Retry::spawn(strategy, || {
        attempt += 1;
        let current = attempt;
        let fut = operation();
        async move {
            match fut.await {
                Ok(value) => Ok(value),
                Err(e) if !e.is_retryable() => {
                    debug!(attempt = current, error = %e, "Permanent error, not retrying");
                    Err(RetryError::Permanent(e))
                }
                Err(e) if deadline.is_some_and(Deadline::is_exhausted) => {
                    warn!(attempt = current, error = %e, "Budget exhausted, not retrying");
                    Err(RetryError::Permanent(e))
                }
                Err(e) => {
                    warn!(attempt = current, error = %e, "Transient error, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
            }
        }
    })
    .await
}
