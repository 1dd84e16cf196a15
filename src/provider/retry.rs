use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::UnifyError;

/// Upper bound on any single backoff wait.
const BACKOFF_CAP_MS: u64 = 10_000;

/// Base delay doubled on every retry.
const BACKOFF_BASE_MS: u64 = 1_000;

/// Retries a fallible operation with capped exponential backoff and jitter.
///
/// The operation runs up to `max_retries + 1` times. A wait of
/// `min(1000 * 2^attempt + jitter, 10_000)` ms (jitter uniform in `[0, 1000)`)
/// happens before each retry, never before the first attempt. When every
/// attempt fails the last error is returned unchanged so callers see the real
/// root cause instead of a synthetic wrapper.
///
/// This wraps the initiation of a call only; a stream that fails after it has
/// started delivering chunks must not be retried, or consumers would observe
/// duplicated deltas.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    mut operation: F,
) -> Result<T, UnifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UnifyError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_retries => return Err(err),
            Err(_) => {
                tokio::time::sleep(backoff_delay(attempt)).await;
                attempt += 1;
            }
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    // 2^attempt saturates well past the cap; clamping the shift keeps the
    // arithmetic in range for absurd retry budgets.
    let exponential = BACKOFF_BASE_MS << attempt.min(16);
    let jitter = rand::thread_rng().gen_range(0..1_000);
    Duration::from_millis((exponential + jitter).min(BACKOFF_CAP_MS))
}

/// Extracts the `Retry-After` header (in seconds) if present.
///
/// Providers occasionally instruct clients to wait before re-sending requests.
/// Only the numeric form is parsed; HTTP-date values are ignored because the
/// vendors primarily use seconds.
pub(crate) fn retry_after_from_headers(headers: &HashMap<String, String>) -> Option<Duration> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
        .and_then(|(_, value)| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn flaky_operation(
        counter: &AtomicU32,
        failures_before_success: u32,
    ) -> impl Future<Output = Result<u32, UnifyError>> + '_ {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < failures_before_success {
                Err(UnifyError::transport(format!("attempt {attempt} failed")))
            } else {
                Ok(attempt)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_without_retry_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, || flaky_operation(&calls, 0)).await;
        assert_eq!(result.expect("should succeed"), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_final_allowed_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, || flaky_operation(&calls, 3)).await;
        assert_eq!(result.expect("should succeed on last attempt"), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_propagates_last_error_unchanged() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(2, || flaky_operation(&calls, u32::MAX)).await;
        match result {
            Err(UnifyError::Transport { message }) => {
                // Last observed failure, not the first and not a wrapper.
                assert_eq!(message, "attempt 2 failed");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(0, || flaky_operation(&calls, u32::MAX)).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_grows_exponentially_and_caps() {
        for attempt in 0..8 {
            let delay = backoff_delay(attempt).as_millis() as u64;
            let floor = (BACKOFF_BASE_MS << attempt.min(16)).min(BACKOFF_CAP_MS);
            assert!(delay >= floor, "attempt {attempt}: {delay} < {floor}");
            assert!(delay <= BACKOFF_CAP_MS);
        }
    }

    #[test]
    fn retry_after_header_is_case_insensitive() {
        let headers = HashMap::from([("Retry-After".to_string(), "5".to_string())]);
        assert_eq!(
            retry_after_from_headers(&headers),
            Some(Duration::from_secs(5))
        );

        let headers = HashMap::from([("retry-after".to_string(), " 12 ".to_string())]);
        assert_eq!(
            retry_after_from_headers(&headers),
            Some(Duration::from_secs(12))
        );

        let headers = HashMap::from([("retry-after".to_string(), "soon".to_string())]);
        assert_eq!(retry_after_from_headers(&headers), None);
    }
}
