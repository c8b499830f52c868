//! Bounded retry with pluggable backoff
//!
//! A single loop shared by every retry policy in the crate. A policy is the
//! triple `(max_attempts, backoff, is_retryable)`: how many attempts to make in
//! total, how long to wait after a given failed attempt, and which errors are
//! worth another try.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Cap on the exponent so `base * 2^n` can't overflow
const MAX_BACKOFF_SHIFT: u32 = 16;

/// One attempt made by [`RetryPolicy::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAttempt {
    /// 1-based attempt number
    pub attempt_number: u32,
    /// Time waited before this attempt started (zero for the first)
    pub delay_before: Duration,
}

/// Final result of a retried operation together with the attempts it took
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    pub attempts: Vec<RetryAttempt>,
}

/// Retry policy parameterized by a backoff function and a retryability check
pub struct RetryPolicy<B, R> {
    max_attempts: u32,
    backoff: B,
    is_retryable: R,
}

impl<B, R> RetryPolicy<B, R> {
    /// `max_attempts` counts the first call; zero is treated as one.
    pub fn new(max_attempts: u32, backoff: B, is_retryable: R) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            is_retryable,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds, returns a non-retryable error, or
    /// the attempt budget is spent.
    ///
    /// `operation` receives the 1-based attempt number. `backoff` receives the
    /// number of the attempt that just failed and its error.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        B: Fn(u32, &E) -> Duration,
        R: Fn(&E) -> bool,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempts = Vec::new();
        let mut attempt = 1;
        let mut delay_before = Duration::ZERO;

        loop {
            attempts.push(RetryAttempt {
                attempt_number: attempt,
                delay_before,
            });

            let error = match operation(attempt).await {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts,
                    }
                }
                Err(error) => error,
            };

            if attempt >= self.max_attempts || !(self.is_retryable)(&error) {
                tracing::warn!(
                    attempt,
                    max_attempts = self.max_attempts,
                    error = %error,
                    "Giving up after failed attempt"
                );
                return RetryOutcome {
                    result: Err(error),
                    attempts,
                };
            }

            delay_before = (self.backoff)(attempt, &error);
            tracing::info!(
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = u64::try_from(delay_before.as_millis()).unwrap_or(u64::MAX),
                error = %error,
                "Attempt failed, retrying"
            );
            tokio::time::sleep(delay_before).await;
            attempt += 1;
        }
    }
}

/// `base * 2^(attempt-1)`: 1x, 2x, 4x, ...
pub fn exponential(base: Duration, attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
    base.saturating_mul(1 << shift)
}

/// `base * attempt`: 1x, 2x, 3x, ...
pub fn linear(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt.max(1))
}
