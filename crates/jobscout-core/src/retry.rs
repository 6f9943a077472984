//! Rate-limited outbound caller with exponential backoff.
//!
//! Wraps any outbound network operation with retry on transient failures
//! (429, 5xx-class, network errors, timeouts). Used identically for source
//! fetches, description fetches, and oracle calls — it has no knowledge of
//! payload semantics.

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Backoff parameters for the caller.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum total attempts, including the first.
    pub max_attempts: u32,

    /// Base delay; attempt n waits `base_delay * 2^(n-1)` plus jitter.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    /// 3 attempts, 500ms base — bounded worst case of ~3.5s of waiting.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Delay before retrying after the given (1-based) failed attempt:
    /// exponential in the attempt number plus uniform jitter in
    /// `[0, base_delay]` to avoid synchronized retry storms.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1));
        let jitter_ms = rand_jitter_ms(self.base_delay.as_millis() as u64);
        exp + Duration::from_millis(jitter_ms)
    }
}

/// Retrying wrapper around an async operation.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    config: RetryConfig,
}

impl Caller {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `op`, retrying on retryable errors up to the attempt budget.
    ///
    /// Non-retryable failures (4xx other than 429, malformed responses)
    /// return immediately. The backoff sleep is an await point, not a
    /// thread-blocking sleep, so concurrent calls are not serialized.
    pub async fn call<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.config.backoff_delay(attempt);
                    tracing::warn!(
                        call = %label,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = %delay.as_millis(),
                        error = %err,
                        "Retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if attempt > 1 {
                        tracing::warn!(call = %label, attempt, error = %err, "Retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }
}

/// Jitter in `[0, max_ms)` without the `rand` crate: an xorshift64 step
/// over the nanosecond clock. Spreads out retries; nothing more is needed.
fn rand_jitter_ms(max_ms: u64) -> u64 {
    if max_ms == 0 {
        return 0;
    }
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x % max_ms
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_caller(max_attempts: u32) -> Caller {
        Caller::new(RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
        })
    }

    #[tokio::test]
    async fn succeeds_first_try() {
        let caller = fast_caller(3);
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<u32, AppError> = caller
            .call("test", || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limit_then_succeeds() {
        let caller = fast_caller(3);
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<&str, AppError> = caller
            .call("test", || {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AppError::RateLimitExceeded)
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_fails_immediately() {
        let caller = fast_caller(3);
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<(), AppError> = caller
            .call("test", || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(AppError::HttpError("HTTP 404 for url".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(AppError::HttpError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_returns_last_error() {
        let caller = fast_caller(3);
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<(), AppError> = caller
            .call("test", || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(AppError::NetworkError("connection reset".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(AppError::NetworkError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_is_exponential_and_jitter_bounded() {
        let config = RetryConfig {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
        };
        for _ in 0..50 {
            let d1 = config.backoff_delay(1);
            let d2 = config.backoff_delay(2);
            let d3 = config.backoff_delay(3);
            assert!(d1 >= Duration::from_millis(100) && d1 < Duration::from_millis(200));
            assert!(d2 >= Duration::from_millis(200) && d2 < Duration::from_millis(300));
            assert!(d3 >= Duration::from_millis(400) && d3 < Duration::from_millis(500));
        }
    }
}
