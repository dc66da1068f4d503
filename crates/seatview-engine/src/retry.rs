//! Retry execution loop: classifies errors via `PipelineError::is_retryable`
//! and schedules delays from the data-only tables in
//! `seatview_core::retry`, with jitter on rate-limited attempts. Mirrors
//! the retry-loop idiom of `bbr-client-engine::worker`'s
//! `compute_witness`/`submit_witness`, generalized from a fixed 5s sleep
//! into the three named policies.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use seatview_core::error::PipelineError;
use seatview_core::retry::{RetryPolicy, RATE_LIMIT_JITTER_FRACTION};

/// Runs `op` under `policy`, retrying retryable errors with backoff and
/// jitter. `on_retry` is called before each sleep, for logging/event
/// emission; it is not called after the final failed attempt.
pub(crate) async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
    mut on_retry: impl FnMut(u32, &E),
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<PipelineError> + Clone,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let classified: PipelineError = err.clone().into();
                if !classified.is_retryable() || attempt >= policy.max_attempts {
                    return Err(err);
                }
                on_retry(attempt, &err);
                let delay = delay_for(policy, &classified, attempt);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn delay_for(policy: &RetryPolicy, err: &PipelineError, attempt: u32) -> Duration {
    let base = policy.backoff_for_attempt(attempt);
    if matches!(err, PipelineError::RateLimited(_)) {
        let jitter_fraction = rand::thread_rng().gen_range(0.0..=RATE_LIMIT_JITTER_FRACTION);
        base + Duration::from_secs_f64(base.as_secs_f64() * jitter_fraction)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatview_core::retry::FAST;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_retries() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, PipelineError> = run_with_retry(
            &FAST,
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(PipelineError::Transient("flaky".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            },
            |_, _| {},
        )
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_stops_immediately() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, PipelineError> = run_with_retry(
            &FAST,
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move { Err(PipelineError::NonRetryable("bad config".to_string())) }
            },
            |_, _| {},
        )
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, PipelineError> = run_with_retry(
            &FAST,
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move { Err(PipelineError::Transient("always fails".to_string())) }
            },
            |_, _| {},
        )
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), FAST.max_attempts);
    }
}
