//! Bounded fixed-delay retry

use std::time::Duration;

/// How many times to attempt an operation and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub max_attempts: u32,
    /// Wait before each retry
    pub delay: Duration,
}

impl RetryPolicy {
    /// One retry after `delay`
    pub fn once_after(delay: Duration) -> Self {
        Self {
            max_attempts: 2,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once_after(Duration::ZERO)
    }
}

/// Run `op`, retrying errors accepted by `is_retryable` under `policy`
///
/// `on_retry` is called with the failed attempt number (1-based) and its
/// error before each wait. The final error is returned unchanged once the
/// attempts are used up or an error is not retryable.
pub async fn with_retry<T, E, R, N, F>(
    policy: RetryPolicy,
    is_retryable: R,
    mut on_retry: N,
    mut op: F,
) -> Result<T, E>
where
    R: Fn(&E) -> bool,
    N: FnMut(u32, &E),
    F: AsyncFnMut() -> Result<T, E>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
                on_retry(attempt, &e);
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
