//! Gemini API client
//!
//! Thin client for the generativelanguage `generateContent` endpoint. One
//! credential per call, no retries here: key rotation lives in `keypool`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::GeminiError;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Seam between the rotation policy and the network.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt` using the given credential.
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, GeminiError>;
}

/// Gemini API client. Holds the shared HTTP client and the model name;
/// credentials are passed per call.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    model: String,
}

/// API request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// API response
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(model: &str) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, GeminiError> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(
            "Calling Gemini API: model={}, prompt_len={}",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: "response contained no text candidates".to_string(),
            });
        }

        Ok(text)
    }
}

/// Classify an error response. 429 is the structured signal; the error body
/// is a fallback because quota errors do not always arrive with that status.
fn classify_error(status: StatusCode, body: &str) -> GeminiError {
    if status == StatusCode::TOO_MANY_REQUESTS || is_rate_limit_body(body) {
        return GeminiError::RateLimited;
    }
    GeminiError::Api {
        status: status.as_u16(),
        message: truncate(body, 500),
    }
}

fn is_rate_limit_body(body: &str) -> bool {
    body.contains("RESOURCE_EXHAUSTED") || body.contains("429")
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_rate_limit() {
        let err = classify_error(StatusCode::TOO_MANY_REQUESTS, "quota exceeded");
        assert!(matches!(err, GeminiError::RateLimited));
    }

    #[test]
    fn resource_exhausted_body_is_rate_limit() {
        let body = r#"{"error":{"code":403,"status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_error(StatusCode::FORBIDDEN, body);
        assert!(matches!(err, GeminiError::RateLimited));
    }

    #[test]
    fn other_status_is_api_error() {
        let err = classify_error(StatusCode::BAD_REQUEST, "invalid argument");
        match err {
            GeminiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid argument");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn long_error_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = classify_error(StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            GeminiError::Api { message, .. } => assert_eq!(message.len(), 500),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn request_body_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hi" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn response_text_extraction() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        let text: Vec<String> = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .filter_map(|p| p.text)
            .collect();
        assert_eq!(text, vec!["hello"]);
    }
}
