//! Upstream error types

use thiserror::Error;

/// Error from a single upstream attempt, with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Overloaded, message)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Http { status }, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::MalformedResponse, message)
    }
}

/// Error classification for backoff selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Upstream reported transient overload (503)
    Overloaded,
    /// Any other non-success HTTP status
    Http { status: u16 },
    /// No HTTP response at all: connect failure, timeout, truncated body
    Network,
    /// Success status but the payload had no usable candidate text
    MalformedResponse,
}

impl LlmErrorKind {
    pub fn is_overload(self) -> bool {
        matches!(self, Self::Overloaded)
    }

    /// HTTP status behind the error, when there was a response
    pub fn status(self) -> Option<u16> {
        match self {
            Self::Overloaded => Some(503),
            Self::Http { status } => Some(status),
            Self::Network | Self::MalformedResponse => None,
        }
    }
}
