//! Bounded retry with exponential backoff for the two network stages.
//!
//! The wait before attempt `n` (1-based) is `backoff_ms * 2^(n-1)`: with
//! 500 ms base and 3 retries the sequence is 500 ms → 1 s → 2 s. Only errors
//! for which [`QuizError::is_retryable`] holds are retried; everything else is
//! returned on first failure.

use crate::error::QuizError;
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Run `op` up to `1 + max_retries` times.
pub async fn with_retry<T, F, Fut>(
    label: &str,
    max_retries: u32,
    backoff_ms: u64,
    mut op: F,
) -> Result<T, QuizError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, QuizError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                attempt += 1;
                let backoff = backoff_ms.saturating_mul(2u64.saturating_pow(attempt - 1));
                warn!(
                    "{}: attempt {} failed: {}; retry {}/{} after {}ms",
                    label, attempt, e, attempt, max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = &AtomicU32::new(0);
        let result = with_retry("test", 3, 1, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(QuizError::EmptyResponse)
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry("test", 2, 1, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(QuizError::ModelTimeout { secs: 1 })
        })
        .await;
        assert!(matches!(result, Err(QuizError::ModelTimeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_immediately() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry("test", 5, 1, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(QuizError::AuthError {
                provider: "openai".into(),
                detail: "401".into(),
            })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_retries_is_a_single_attempt() {
        let calls = &AtomicU32::new(0);
        let _: Result<(), _> = with_retry("test", 0, 1, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(QuizError::EmptyResponse)
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
