//! Bounded-retry upstream generation
//!
//! Overload (503) backs off exponentially: 1s, 2s, 4s. Every other failure
//! (other HTTP statuses, malformed payloads, transport errors) still consumes
//! an attempt and backs off linearly: 1s, 2s, 3s. With the default cap of three
//! attempts only the first two waits ever happen.

use super::{LlmError, LlmRequest, LlmService};
use crate::prompt::praise_prompt;
use crate::retry::{self, RetryAttempt, RetryPolicy};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Attempt cap and backoff unit for upstream calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamRetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for UpstreamRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Terminal failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Overloaded,
    UpstreamError,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Overloaded => "overloaded",
            FailureKind::UpstreamError => "upstream_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one `generate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamResult {
    Success { text: String },
    Failure { kind: FailureKind, retryable: bool },
}

impl UpstreamResult {
    fn from_error(error: &LlmError) -> Self {
        if error.kind.is_overload() {
            UpstreamResult::Failure {
                kind: FailureKind::Overloaded,
                retryable: true,
            }
        } else {
            UpstreamResult::Failure {
                kind: FailureKind::UpstreamError,
                retryable: false,
            }
        }
    }
}

/// Upstream client applying the retry policy around a single-attempt service
pub struct UpstreamClient {
    service: Arc<dyn LlmService>,
    config: UpstreamRetryConfig,
}

impl UpstreamClient {
    pub fn new(service: Arc<dyn LlmService>, config: UpstreamRetryConfig) -> Self {
        Self { service, config }
    }

    /// Generate a praise reply for an already-validated message
    pub async fn generate(&self, message: &str) -> UpstreamResult {
        self.generate_with_attempts(message).await.0
    }

    pub(crate) async fn generate_with_attempts(
        &self,
        message: &str,
    ) -> (UpstreamResult, Vec<RetryAttempt>) {
        let request = LlmRequest::new(praise_prompt(message));
        let base = self.config.base_delay;

        // Every error consumes an attempt; only the backoff shape differs.
        let policy = RetryPolicy::new(
            self.config.max_attempts,
            move |attempt: u32, error: &LlmError| {
                if error.kind.is_overload() {
                    retry::exponential(base, attempt)
                } else {
                    retry::linear(base, attempt)
                }
            },
            |_: &LlmError| true,
        );

        let service = &self.service;
        let request = &request;
        let outcome = policy
            .run(|attempt| {
                tracing::debug!(attempt, max_attempts = policy.max_attempts(), "Calling upstream");
                service.complete(request)
            })
            .await;

        let result = match outcome.result {
            Ok(response) => {
                tracing::info!(
                    attempt = outcome.attempts.last().map(|a| a.attempt_number),
                    "Upstream generation succeeded"
                );
                UpstreamResult::Success {
                    text: response.text,
                }
            }
            Err(error) => {
                let result = UpstreamResult::from_error(&error);
                tracing::error!(
                    attempts = outcome.attempts.len(),
                    last_error = %error,
                    ?result,
                    "All upstream attempts failed"
                );
                result
            }
        };

        (result, outcome.attempts)
    }
}
