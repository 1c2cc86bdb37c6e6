//! Retry logic with exponential backoff
//!
//! Both API call sites (task submission and task status) go through
//! [`with_retry`], each with its own [`RetryConfig`]. Whether an error is worth
//! another attempt is decided by [`IsRetryable`], so the policy object and the
//! error classification stay independent.
//!
//! # Example
//!
//! ```no_run
//! use shopping_serp::retry::{IsRetryable, with_retry};
//! use shopping_serp::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::with_max_attempts(5);
//! with_retry(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Connect/read failures, HTTP error statuses and undecodable bodies
            Error::Network(_) => true,
            // From the caller's side an unaccepted status is just a failed attempt
            Error::ApiStatus { .. } => true,
            Error::Config { .. } => false,
            Error::UnexpectedResponse(_) => false,
            // Retrying a whole poll sequence would silently extend the deadline
            Error::Timeout { .. } => false,
            Error::Serialization(_) => false,
        }
    }
}

/// Delay to wait after the `failed_attempts`-th failure (1-based)
///
/// `initial_delay * multiplier^(failed_attempts - 1)`, capped at `max_delay`,
/// before jitter.
pub fn backoff_delay(config: &RetryConfig, failed_attempts: u32) -> Duration {
    let exponent = failed_attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
    let secs = config.initial_delay.as_secs_f64() * config.backoff_multiplier.powi(exponent);
    if !secs.is_finite() || secs >= config.max_delay.as_secs_f64() {
        return config.max_delay;
    }
    Duration::from_secs_f64(secs.max(0.0)).min(config.max_delay)
}

/// Execute an async operation under a retry policy
///
/// The operation runs at most `config.max_attempts` times (at least once).
/// Non-retryable errors return immediately. When the ceiling is reached the
/// last error is returned as-is.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = backoff_delay(config, attempt);
                let delay = if config.jitter {
                    add_jitter(delay).min(config.max_delay)
                } else {
                    delay
                };

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "Operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient(u32),
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient(n) => write!(f, "transient error #{n}"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient(_))
        }
    }

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(80),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn stock_schedule_doubles_from_one_second_and_caps_at_eight() {
        let config = RetryConfig::with_max_attempts(7);
        let delays: Vec<u64> = (1..=6)
            .map(|n| backoff_delay(&config, n).as_secs())
            .collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 8, 8]);
    }

    #[test]
    fn backoff_never_exceeds_cap_even_for_huge_attempt_numbers() {
        let config = RetryConfig::default();
        for n in [1, 10, 100, 1_000, u32::MAX] {
            assert!(backoff_delay(&config, n) <= Duration::from_secs(8));
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt_calls_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TestError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_then_success() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err(TestError::Transient(count))
                } else {
                    Ok(count)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn ceiling_counts_total_attempts_and_returns_last_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError::Transient(count))
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), TestError::Transient(4));
        assert_eq!(counter.load(Ordering::SeqCst), 5, "5 attempts in total");
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(7), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError::Permanent)
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), TestError::Permanent);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_max_attempts_still_calls_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let _ = with_retry(&fast_config(0), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TestError::Transient(0))
            }
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gaps_between_attempts_grow_and_respect_cap() {
        let timestamps = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let ts_clone = timestamps.clone();

        let _ = with_retry(&fast_config(6), || {
            let ts = ts_clone.clone();
            async move {
                ts.lock().await.push(std::time::Instant::now());
                Err::<(), _>(TestError::Transient(0))
            }
        })
        .await;

        let ts = timestamps.lock().await;
        assert_eq!(ts.len(), 6);

        let gaps: Vec<Duration> = ts.windows(2).map(|w| w[1].duration_since(w[0])).collect();
        // 10ms, 20ms, 40ms, 80ms, 80ms
        assert!(gaps[0] >= Duration::from_millis(10), "gaps: {gaps:?}");
        assert!(gaps[1] >= Duration::from_millis(20), "gaps: {gaps:?}");
        assert!(gaps[2] >= Duration::from_millis(40), "gaps: {gaps:?}");
        assert!(gaps[3] >= Duration::from_millis(80), "gaps: {gaps:?}");
        // Upper bound is generous to tolerate CI scheduling noise
        for gap in &gaps {
            assert!(*gap < Duration::from_millis(500), "gaps: {gaps:?}");
        }
    }

    #[test]
    fn add_jitter_stays_within_bounds() {
        let delay = Duration::from_millis(50);
        for i in 0..200 {
            let jittered = add_jitter(delay);
            assert!(jittered >= delay, "iteration {i}: {jittered:?}");
            assert!(jittered <= delay * 2, "iteration {i}: {jittered:?}");
        }
    }

    #[test]
    fn crate_error_classification() {
        assert!(
            Error::ApiStatus {
                status_code: Some(50000),
                status_message: None,
            }
            .is_retryable()
        );
        assert!(!Error::Timeout { max_wait_secs: 10 }.is_retryable());
        assert!(!Error::UnexpectedResponse("no id".to_string()).is_retryable());
        assert!(!Error::config("missing", "DATAFORSEO_LOGIN").is_retryable());
        let json_err = serde_json::from_str::<String>("bad").unwrap_err();
        assert!(!Error::Serialization(json_err).is_retryable());
    }
}
