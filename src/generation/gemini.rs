use crate::generation::model::GenerationError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Everything one structured-generation call needs.
#[derive(Clone, Debug)]
pub struct ContentRequest {
    pub model: String,
    pub api_key: String,
    pub prompt: String,
    pub response_schema: Value,
    pub thinking_budget: u32,
}

/// The external text-generation service. Implementations issue exactly one
/// call per invocation and never retry.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// `Ok(None)` means the call succeeded but produced no text.
    async fn generate_content(&self, request: &ContentRequest) -> Result<Option<String>, GenerationError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model.trim()
        )
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(&self, request: &ContentRequest) -> Result<Option<String>, GenerationError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
                thinking_config: (request.thinking_budget > 0).then(|| ThinkingConfig {
                    thinking_budget: request.thinking_budget,
                }),
            },
        };

        info!("will call generation service, model: {}", request.model);
        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    GenerationError::timeout(format!("timed out waiting for generation service: {}", error))
                } else {
                    GenerationError::transport(format!("request failed: {}", error))
                }
            })?;

        let status = response.status();
        info!("generation service responded, status_code: {}", status);
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if status == StatusCode::TOO_MANY_REQUESTS {
                format!("rate limited ({}): {}", status, text)
            } else if status.is_client_error() {
                format!("rejected ({}): {}", status, text)
            } else {
                format!("service error ({}): {}", status, text)
            };
            return Err(GenerationError::Transport {
                status: Some(status.as_u16()),
                message,
                timed_out: false,
            });
        }

        let envelope: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::transport(format!("unreadable response envelope: {}", e)))?;

        let text: String = envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();
        debug!("generation service returned {} bytes of text", text.len());

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}
