use crate::config::{API_KEY_VAR, UpstreamConfig};
use crate::errors::CoreError;
use crate::models::{CompletionRequest, CompletionResponse};
use crate::scrub::{scrub_json, scrub_secrets};
use crate::util::truncate_for_error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::backend::CompletionBackend;

/// Message used when the upstream gives no usable error text of its own.
const GENERIC_FAILURE: &str = "OpenAI request failed";

/// Backend that calls an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiBackend {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Build the backend. A missing API key is not an error here: the server
    /// still starts and reports the missing credential per request.
    pub fn new(config: &UpstreamConfig) -> Result<Self, CoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| CoreError::Config(format!("building HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, CoreError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CoreError::Config(format!("missing configuration: {API_KEY_VAR} is not set"))
        })?;

        let payload = ChatCompletionRequest::new(&self.model, request);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), body_len = body.len(), "upstream returned error status");
            return Err(upstream_error(&body));
        }

        parse_completion(&body)
    }
}

// ── Wire format ──

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(&request.system),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text {
                            text: &request.text,
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: format!("data:image/jpeg;base64,{}", request.image_base64),
                            },
                        },
                    ]),
                },
            ],
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ── Response handling ──

fn parse_completion(body: &str) -> Result<CompletionResponse, CoreError> {
    let malformed = |reason: &str| CoreError::Upstream {
        message: format!("malformed response from OpenAI: {reason}"),
        details: Some(Value::String(scrub_secrets(truncate_for_error(body, 500)))),
    };

    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| malformed(&e.to_string()))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or_else(|| malformed("missing choices[0].message.content"))?;

    let usage = parsed.usage.unwrap_or_default();
    Ok(CompletionResponse {
        text,
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    })
}

/// Best-effort error from a non-2xx body: prefer the upstream `error.message`.
fn upstream_error(body: &str) -> CoreError {
    let parsed = serde_json::from_str::<Value>(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(scrub_secrets)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());

    let details = match parsed {
        Some(value) => Some(scrub_json(value)),
        None if body.trim().is_empty() => None,
        None => Some(Value::String(scrub_secrets(truncate_for_error(body, 500)))),
    };

    CoreError::Upstream { message, details }
}

fn transport_error(e: reqwest::Error) -> CoreError {
    let message = if e.is_timeout() {
        "OpenAI request timed out".to_string()
    } else {
        GENERIC_FAILURE.to_string()
    };
    CoreError::Upstream {
        message,
        details: Some(Value::String(scrub_secrets(&e.to_string()))),
    }
}
