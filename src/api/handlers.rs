//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse};
use super::AppState;
use crate::llm::{FailureKind, LoggingService, UpstreamClient, UpstreamResult};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::Instrument;
use uuid::Uuid;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat).fallback(method_not_allowed))
        .route("/version", get(get_version))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Open CORS: any origin, `POST`/`OPTIONS`, `Content-Type`.
///
/// Answers every `OPTIONS` request itself with 200.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// ============================================================
// Chat
// ============================================================

async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    async move {
        let request = ChatRequest::from_body(&body).map_err(|e| {
            tracing::info!(error = %e, "Rejected chat request");
            AppError::InvalidMessage
        })?;

        // Key is looked up per request so rotating it needs no restart
        let Some(api_key) = state.api_key.resolve() else {
            tracing::error!("Upstream API key is not configured");
            return Err(AppError::Configuration);
        };

        let service = Arc::new(LoggingService::new(state.connector.connect(api_key)));
        let upstream = UpstreamClient::new(service, state.retry);

        match upstream.generate(&request.message).await {
            UpstreamResult::Success { text } => Ok(Json(ChatResponse::new(text))),
            UpstreamResult::Failure {
                kind: FailureKind::Overloaded,
                ..
            } => Err(AppError::Overloaded),
            UpstreamResult::Failure { kind, .. } => {
                tracing::error!(%kind, "Chat request failed upstream");
                Err(AppError::Server)
            }
        }
    }
    .instrument(span)
    .await
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("praise-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppError {
    MethodNotAllowed,
    InvalidMessage,
    Configuration,
    Overloaded,
    Server,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, is_retryable) = match self {
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed",
                "POST 요청만 지원합니다.",
                None,
            ),
            AppError::InvalidMessage => (
                StatusCode::BAD_REQUEST,
                "Invalid message",
                "올바른 메시지를 입력해주세요.",
                None,
            ),
            AppError::Configuration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error",
                "API 설정에 문제가 있습니다.",
                None,
            ),
            AppError::Overloaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
                "AI 서비스가 일시적으로 과부하 상태입니다. 잠시 후 다시 시도해주세요. 🤖💙",
                Some(true),
            ),
            AppError::Server => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
                "서버에서 문제가 발생했습니다. 잠시 후 다시 시도해주세요.",
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error,
            message,
            is_retryable,
        });
        (status, body).into_response()
    }
}
