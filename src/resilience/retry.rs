// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Retry logic with quadratic backoff.
//!
//! Attempt `i` (0-indexed) waits `i² × backoff_unit` before running, so the
//! first attempt is immediate and later ones back off 1, 4, 9, 16 units.
//! Retries are local and synchronous: the caller waits out the whole schedule.
//!
//! # Example
//!
//! ```
//! use doc_writer::RetryConfig;
//! use std::time::Duration;
//!
//! let standard = RetryConfig::standard();
//! assert_eq!(standard.max_attempts, 5);
//! assert_eq!(standard.backoff(0), Duration::ZERO);
//! assert_eq!(standard.backoff(3), Duration::from_secs(9));
//! assert_eq!(standard.total_backoff(), Duration::from_secs(30));
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::DocWriterConfig;

/// Configuration for insert retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Time unit the quadratic schedule is measured in
    pub backoff_unit: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl RetryConfig {
    /// 5 attempts, 1 second unit: waits 0, 1, 4, 9, 16 seconds.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            max_attempts: 5,
            backoff_unit: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &DocWriterConfig) -> Self {
        Self {
            max_attempts: config.retry_max_attempts,
            backoff_unit: Duration::from_millis(config.retry_backoff_unit_ms),
        }
    }

    /// Fast retry for tests (minimal delays)
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            max_attempts: 5,
            backoff_unit: Duration::from_millis(1),
        }
    }

    /// Delay before attempt `attempt`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt.saturating_mul(attempt))
    }

    /// Sum of every delay in the schedule, i.e. the longest a document can spend retrying
    /// (excluding the time the attempts themselves take).
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_attempts.max(1))
            .map(|i| self.backoff(i))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Run `operation` until it succeeds or `config.max_attempts` attempts have failed.
///
/// The closure receives the attempt index. On exhaustion the last error is
/// returned. A `max_attempts` of zero still runs once.
pub async fn retry<F, Fut, T, E>(
    operation_name: &str,
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        let delay = config.backoff(attempt);
        if !delay.is_zero() {
            sleep(delay).await;
        }

        match operation(attempt).await {
            Ok(val) => {
                if attempt > 0 {
                    info!(operation = operation_name, attempt, "Operation succeeded after retry");
                }
                return Ok(val);
            }
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts {
                    warn!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %err,
                        "Retries exhausted"
                    );
                    return Err(err);
                }
                debug!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    next_delay = ?config.backoff(attempt),
                    "Operation failed, backing off"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError(String);

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_first_try() {
        let result: Result<i32, TestError> = retry(
            "test_op",
            &RetryConfig::test(),
            |_| async { Ok(42) },
        ).await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<u32, TestError> = retry(
            "test_op",
            &RetryConfig::test(),
            |attempt| {
                let a = attempts_clone.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err(TestError(format!("fail {}", attempt)))
                    } else {
                        Ok(attempt)
                    }
                }
            },
        ).await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausts_after_max_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<i32, TestError> = retry(
            "test_op",
            &RetryConfig::test(),
            |attempt| {
                let a = attempts_clone.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Err(TestError(format!("always fail {}", attempt)))
                }
            },
        ).await;

        // Exactly max_attempts, not max_attempts + 1
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        assert!(result.unwrap_err().0.contains("always fail 4"));
    }

    #[tokio::test]
    async fn test_zero_max_attempts_still_runs_once() {
        let config = RetryConfig { max_attempts: 0, backoff_unit: Duration::from_millis(1) };
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<(), TestError> = retry("test_op", &config, |_| {
            let a = attempts_clone.clone();
            async move {
                a.fetch_add(1, Ordering::SeqCst);
                Err(TestError("nope".into()))
            }
        }).await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_quadratic_schedule() {
        let start = tokio::time::Instant::now();
        let stamps = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let stamps_clone = stamps.clone();

        let _: Result<(), TestError> = retry("test_op", &RetryConfig::standard(), |_| {
            let s = stamps_clone.clone();
            async move {
                s.lock().push(start.elapsed());
                Err(TestError("down".into()))
            }
        }).await;

        let stamps = stamps.lock().clone();
        let secs: Vec<u64> = stamps.iter().map(Duration::as_secs).collect();
        // Cumulative: 0, 0+1, 1+4, 5+9, 14+16
        assert_eq!(secs, vec![0, 1, 5, 14, 30]);
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_is_attempt_squared() {
        let config = RetryConfig::standard();
        let delays: Vec<u64> = (0..5).map(|i| config.backoff(i).as_secs()).collect();
        assert_eq!(delays, vec![0, 1, 4, 9, 16]);
    }

    #[test]
    fn test_total_backoff() {
        assert_eq!(RetryConfig::standard().total_backoff(), Duration::from_secs(30));

        let config = RetryConfig { max_attempts: 3, backoff_unit: Duration::from_millis(10) };
        assert_eq!(config.total_backoff(), Duration::from_millis(50));
    }

    #[test]
    fn test_from_config() {
        let config = DocWriterConfig {
            retry_max_attempts: 3,
            retry_backoff_unit_ms: 250,
            ..Default::default()
        };
        let retry = RetryConfig::from_config(&config);
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.backoff(2), Duration::from_secs(1));
        assert_eq!(RetryConfig::from_config(&DocWriterConfig::default()), RetryConfig::standard());
    }

    #[test]
    fn test_backoff_saturates() {
        let config = RetryConfig { max_attempts: 5, backoff_unit: Duration::MAX };
        assert_eq!(config.backoff(2), Duration::MAX);
    }
}
