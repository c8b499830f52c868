//! Google Gemini provider implementation

use super::types::{LlmRequest, LlmResponse, Usage};
use super::{LlmConnector, LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Holds the shared HTTP client and endpoint; hands out per-request services
pub struct GeminiConnector {
    client: Client,
    endpoint: String,
    model: String,
}

impl GeminiConnector {
    pub fn new(api_base: &str, model: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: generate_content_url(api_base, model),
            model: model.to_string(),
        })
    }
}

impl LlmConnector for GeminiConnector {
    fn connect(&self, api_key: SecretString) -> Arc<dyn LlmService> {
        Arc::new(GeminiService {
            client: self.client.clone(),
            api_key,
            endpoint: self.endpoint.clone(),
            model_id: self.model.clone(),
        })
    }
}

fn generate_content_url(api_base: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        model
    )
}

/// Gemini service bound to one API key
pub struct GeminiService {
    client: Client,
    api_key: SecretString,
    endpoint: String,
    model_id: String,
}

impl GeminiService {
    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.generation.temperature,
                top_k: request.generation.top_k,
                top_p: request.generation.top_p,
                max_output_tokens: request.generation.max_output_tokens,
            },
        }
    }

    /// First candidate's first part must carry non-empty text
    fn normalize_response(resp: GeminiResponse) -> Result<LlmResponse, LlmError> {
        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::malformed("No candidates in response"))?;

        let content = candidate
            .content
            .ok_or_else(|| LlmError::malformed("Candidate has no content"))?;

        let text = content
            .parts
            .into_iter()
            .next()
            .and_then(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::malformed("Candidate has no text"))?;

        let usage = resp
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u64::from(u.prompt_token_count),
                output_tokens: u64::from(u.candidates_token_count),
            })
            .unwrap_or_default();

        Ok(LlmResponse { text, usage })
    }

    fn classify_status(status: reqwest::StatusCode, body: &str) -> LlmError {
        let message = serde_json::from_str::<GeminiErrorResponse>(body)
            .map_or_else(|_| body.to_string(), |e| e.error.message);

        match status.as_u16() {
            503 => LlmError::overloaded(format!("Upstream overloaded: {message}")),
            code => LlmError::http(code, format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let gemini_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.expose_secret())])
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                // Strip the URL so the key in the query string never reaches logs
                let e = e.without_url();
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::malformed(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmErrorKind;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_url_uses_v1beta_generate_content() {
        assert_eq!(
            generate_content_url("https://example.test/", "gemini-2.0-flash"),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_request_wire_format() {
        let request = LlmRequest::new("칭찬해 주세요");
        let wire = serde_json::to_value(GeminiService::translate_request(&request)).unwrap();

        assert_eq!(wire["contents"][0]["parts"][0]["text"], "칭찬해 주세요");
        // Single-turn: no role, no system instruction
        assert!(wire["contents"][0].get("role").is_none());
        assert!(wire.get("systemInstruction").is_none());
        let config = &wire["generationConfig"];
        assert_eq!(config["topK"], 40);
        assert_eq!(config["maxOutputTokens"], 200);
        assert!((config["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((config["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_single_candidate() {
        let resp = parse(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "잘했어요!" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16 }
        }));

        let normalized = GeminiService::normalize_response(resp).unwrap();
        assert_eq!(normalized.text, "잘했어요!");
        assert_eq!(normalized.usage.input_tokens, 12);
        assert_eq!(normalized.usage.output_tokens, 4);
    }

    #[test]
    fn test_normalize_rejects_missing_candidates() {
        for body in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{}] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{}] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "   " }] } }] }),
        ] {
            let err = GeminiService::normalize_response(parse(body.clone())).unwrap_err();
            assert_eq!(err.kind, LlmErrorKind::MalformedResponse, "body: {body}");
        }
    }

    #[test]
    fn test_classify_status() {
        let body = r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        let err = GeminiService::classify_status(reqwest::StatusCode::SERVICE_UNAVAILABLE, body);
        assert_eq!(err.kind, LlmErrorKind::Overloaded);
        assert!(err.message.contains("The model is overloaded."));

        let err = GeminiService::classify_status(reqwest::StatusCode::BAD_REQUEST, "not json");
        assert_eq!(err.kind, LlmErrorKind::Http { status: 400 });
        assert!(err.message.contains("not json"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error() {
        // Port 9 (discard) on loopback is closed in test environments
        let connector = GeminiConnector::new("http://127.0.0.1:9", DEFAULT_MODEL).unwrap();
        let service = connector.connect(SecretString::from("test-key".to_string()));

        let err = service.complete(&LlmRequest::new("hi")).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Network);
        assert!(!err.message.contains("test-key"));
    }
}
