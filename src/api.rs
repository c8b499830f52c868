//! HTTP API for the chat service
//!
//! `POST /api/chat` plus a version probe. CORS is open to any origin.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::config::ApiKeySource;
use crate::llm::{LlmConnector, UpstreamRetryConfig};
use std::sync::Arc;

/// Application state shared across handlers
///
/// Read-only; nothing here changes between requests.
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn LlmConnector>,
    pub api_key: ApiKeySource,
    pub retry: UpstreamRetryConfig,
}

impl AppState {
    pub fn new(
        connector: Arc<dyn LlmConnector>,
        api_key: ApiKeySource,
        retry: UpstreamRetryConfig,
    ) -> Self {
        Self {
            connector,
            api_key,
            retry,
        }
    }
}
