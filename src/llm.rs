//! Upstream text-generation client
//!
//! `LlmService` makes exactly one upstream call; `UpstreamClient` layers the
//! bounded retry policy on top of it.

mod error;
mod gemini;
#[cfg(test)]
pub mod testing;
mod types;
mod upstream;

#[allow(unused_imports)] // Public API re-exports
pub use error::{LlmError, LlmErrorKind};
pub use gemini::{GeminiConnector, DEFAULT_API_BASE, DEFAULT_MODEL};
#[allow(unused_imports)] // Public API re-exports
pub use types::*;
pub use upstream::{FailureKind, UpstreamClient, UpstreamResult, UpstreamRetryConfig};

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;

/// Single-attempt interface to a generation provider
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make one generation request. No retries.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Builds a service for a credential resolved at request time
pub trait LlmConnector: Send + Sync {
    fn connect(&self, api_key: SecretString) -> Arc<dyn LlmService>;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "Upstream request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    status = e.kind.status(),
                    "Upstream request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
