//! API request and response types

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Body of `POST /api/chat` did not carry a usable message
#[derive(Debug, Error, PartialEq, Eq)]
#[error("message must be a non-empty string")]
pub struct ValidationError;

/// Validated chat request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Raw message as sent; guaranteed non-blank
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Result<Self, ValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ValidationError);
        }
        Ok(Self { message })
    }

    /// Parse a raw request body.
    ///
    /// Anything other than a JSON object with a string `message` is rejected,
    /// including bodies that aren't JSON at all.
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError)?;
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .ok_or(ValidationError)?;
        Self::new(message)
    }
}

/// Response for a successful chat call
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

impl ChatResponse {
    pub fn new(response: String) -> Self {
        Self {
            success: true,
            response,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_retryable: Option<bool>,
}
