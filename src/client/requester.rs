//! HTTP requester for the chat endpoint
//!
//! Single call per `request`. The only retry is the user-gated one: passing
//! `is_retry = true` waits a fixed delay and then issues the same call once.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Extra wait before a user-triggered retry
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Terminal failure of one requester call
#[derive(Debug, Error)]
pub enum RequestError {
    /// Server answered 503
    #[error("서버가 일시적으로 과부하 상태입니다. (503)")]
    Overloaded,
    /// No response at all: connection refused, timeout, unreadable body
    #[error("네트워크 오류: {0}")]
    Network(String),
    /// Any other failure, carrying the server's message when it sent one
    #[error("{message}")]
    Server {
        status: Option<u16>,
        message: String,
    },
}

impl RequestError {
    /// Whether the UI should offer the manual retry
    pub fn offers_retry(&self) -> bool {
        matches!(self, RequestError::Overloaded | RequestError::Network(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Overloaded => Some(503),
            RequestError::Network(_) => None,
            RequestError::Server { status, .. } => *status,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    message: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatReply {
    success: bool,
    response: Option<String>,
    message: Option<String>,
}

/// Client for `POST /api/chat`
#[derive(Debug, Clone)]
pub struct ResilientRequester {
    client: Client,
    endpoint: String,
    retry_delay: Duration,
}

impl ResilientRequester {
    /// `server_url` is the server root, e.g. `http://127.0.0.1:3000`
    pub fn new(server_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", server_url.trim_end_matches('/')),
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Send `message` and return the AI reply text
    pub async fn request(&self, message: &str, is_retry: bool) -> Result<String, RequestError> {
        tracing::debug!(endpoint = %self.endpoint, is_retry, "Sending chat message");

        if is_retry {
            tokio::time::sleep(self.retry_delay).await;
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatBody { message })
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;
        let reply: ChatReply = serde_json::from_str(&body).unwrap_or_default();

        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::warn!("Chat server overloaded");
            return Err(RequestError::Overloaded);
        }

        if !status.is_success() {
            let message = reply
                .message
                .unwrap_or_else(|| format!("서버 오류 ({})", status.as_u16()));
            tracing::warn!(status = status.as_u16(), %message, "Chat request failed");
            return Err(RequestError::Server {
                status: Some(status.as_u16()),
                message,
            });
        }

        match reply.response.filter(|text| reply.success && !text.is_empty()) {
            Some(text) => {
                tracing::info!(is_retry, "AI reply received");
                Ok(text)
            }
            None => Err(RequestError::Server {
                status: Some(status.as_u16()),
                message: reply
                    .message
                    .unwrap_or_else(|| "AI 응답을 받을 수 없습니다.".to_string()),
            }),
        }
    }
}
