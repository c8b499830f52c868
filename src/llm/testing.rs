//! Mock implementations for testing
//!
//! Queue-driven stand-ins for the upstream so retry and boundary behavior can
//! be exercised without network access.

use super::{LlmConnector, LlmError, LlmRequest, LlmResponse, LlmService, Usage};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

impl LlmResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }
}

/// Mock LLM service that returns queued results in order
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
    /// When each request arrived (tokio clock, so paused time works)
    call_times: Mutex<Vec<Instant>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Gaps between consecutive calls
    pub fn call_gaps(&self) -> Vec<std::time::Duration> {
        let times = self.call_times.lock().unwrap();
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.call_times.lock().unwrap().push(Instant::now());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Connector that always hands out the same mock service
pub struct MockConnector {
    service: Arc<MockLlmService>,
    connects: AtomicUsize,
    last_key: Mutex<Option<String>>,
}

impl MockConnector {
    pub fn new(service: Arc<MockLlmService>) -> Self {
        Self {
            service,
            connects: AtomicUsize::new(0),
            last_key: Mutex::new(None),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn last_key(&self) -> Option<String> {
        self.last_key.lock().unwrap().clone()
    }
}

impl LlmConnector for MockConnector {
    fn connect(&self, api_key: SecretString) -> Arc<dyn LlmService> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        *self.last_key.lock().unwrap() = Some(api_key.expose_secret().to_string());
        self.service.clone()
    }
}
