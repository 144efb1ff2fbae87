//! Gemini generateContent client.
//!
//! Thin wrapper over the REST API: one prompt in, one block of
//! generated text out. No streaming, no tools.

use crate::error::{GenerateError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

const REQUEST_TIMEOUT_SECS: u64 = 180;

/// Client for the Gemini generateContent endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Client Implementation
// ============================================================================

impl GeminiClient {
    /// Creates a client with the key from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(GenerateError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Creates a client with an explicit API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: GEMINI_API_URL.to_string(),
        }
    }

    /// Overrides the endpoint URL. Used by tests to point the client
    /// at a local mock server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sends one prompt and returns the concatenated text of the first
    /// candidate.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiTextPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!("{}?key={}", self.endpoint, self.api_key);

        debug!("Sending {} prompt bytes to generation service", prompt.len());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Service { status, body });
        }

        let api_response: GeminiResponse = response.json().await?;

        if let Some(error) = api_response.error {
            return Err(GenerateError::Api(error.message));
        }

        let text: String = api_response
            .candidates
            .into_iter()
            .flatten()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key".to_string()).with_endpoint(server.uri())
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "hello prompt" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "# Generated" }, { "text": " README" }] }
                }]
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let text = client.generate("hello prompt").await.unwrap();
        assert_eq!(text, "# Generated README");
    }

    #[tokio::test]
    async fn test_generate_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client.generate("p").await.unwrap_err();
        match err {
            GenerateError::Service { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected Service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_surfaces_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "message": "invalid key" }
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client.generate("p").await.unwrap_err();
        assert!(matches!(err, GenerateError::Api(msg) if msg == "invalid key"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": []
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = client.generate("p").await.unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));
    }
}
