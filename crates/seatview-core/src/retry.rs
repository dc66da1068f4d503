//! Data-only retry/backoff policy tables.
//!
//! These describe *what* to do, not *how* to loop — the execution loop
//! (sleeping, counting attempts, applying jitter) lives in
//! `seatview-engine::retry`, in the same split `bbr-client-engine` keeps
//! between `EngineConfig` data and `worker.rs` execution.

use std::time::Duration;

/// Named backoff schedule for one class of call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Multiplier applied to the backoff after each attempt.
    pub multiplier: f64,
    /// Upper bound on any single backoff delay.
    pub cap: Duration,
}

impl RetryPolicy {
    /// Backoff delay before retry attempt `attempt` (1-based: the delay
    /// before the second overall attempt is `attempt = 1`).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let scaled = self.initial_backoff.as_secs_f64() * self.multiplier.powi(attempt as i32 - 1);
        Duration::from_secs_f64(scaled.min(self.cap.as_secs_f64()))
    }
}

/// Storage and JSON-save operations: 3 attempts, 1s initial, x2, 30s cap.
pub const FAST: RetryPolicy = RetryPolicy {
    max_attempts: 3,
    initial_backoff: Duration::from_secs(1),
    multiplier: 2.0,
    cap: Duration::from_secs(30),
};

/// Model build / depth render calls: 3 attempts, 5s initial, x2, 2m cap.
/// Configuration errors are non-retryable regardless of this policy.
pub const BLENDER: RetryPolicy = RetryPolicy {
    max_attempts: 3,
    initial_backoff: Duration::from_secs(5),
    multiplier: 2.0,
    cap: Duration::from_secs(120),
};

/// Image synthesis calls: 5 attempts, 10s initial, x2, 5m cap. Auth errors
/// are non-retryable regardless of this policy.
pub const AI_SYNTHESIS: RetryPolicy = RetryPolicy {
    max_attempts: 5,
    initial_backoff: Duration::from_secs(10),
    multiplier: 2.0,
    cap: Duration::from_secs(300),
};

/// Fraction of the computed delay added as random jitter for rate-limited
/// retries.
pub const RATE_LIMIT_JITTER_FRACTION: f64 = 0.30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_caps_out() {
        assert_eq!(AI_SYNTHESIS.backoff_for_attempt(1), Duration::from_secs(10));
        assert_eq!(AI_SYNTHESIS.backoff_for_attempt(2), Duration::from_secs(20));
        assert_eq!(AI_SYNTHESIS.backoff_for_attempt(6), Duration::from_secs(300));
    }
}
