//! Anthropic native backend implementation.
//!
//! Uses Anthropic's Messages API directly (not an OpenAI-compatible proxy):
//! `x-api-key` header authentication, `anthropic-version` header, and the
//! system prompt as a top-level field rather than a message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vitrine_core::error::BackendError;
use vitrine_core::turn::{Role, Turn};
use vitrine_core::ChatBackend;

use crate::openai_compat::build_client;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic native Messages API backend.
pub struct AnthropicBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicBackend {
    /// Create a new Anthropic backend.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.2,
            max_tokens: 1024,
            client: build_client(120),
        }
    }

    /// Create with a custom base URL (e.g. for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the client-level request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.client = build_client(secs);
        self
    }

    /// Split out system turns — Anthropic takes the system prompt as a
    /// top-level field, not as a message.
    fn extract_system(turns: &[Turn]) -> (Option<String>, Vec<&Turn>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut non_system: Vec<&Turn> = Vec::new();

        for turn in turns {
            match turn.role {
                Role::System => system_parts.push(&turn.content),
                _ => non_system.push(turn),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, non_system)
    }

    fn to_api_messages(turns: &[&Turn]) -> Vec<AnthropicMessage> {
        turns
            .iter()
            .map(|t| AnthropicMessage {
                role: match t.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                },
                content: t.content.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl ChatBackend for AnthropicBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, turns: &[Turn]) -> Result<String, BackendError> {
        let url = format!("{}/v1/messages", self.base_url);
        let (system, messages) = Self::extract_system(turns);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(&messages),
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        if let Some(ref sys) = system {
            body["system"] = serde_json::json!(sys);
        }

        debug!(backend = "anthropic", model = %self.model, turns = turns.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(e.to_string())
                } else {
                    BackendError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(BackendError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(BackendError::AuthenticationFailed(
                "Invalid Anthropic API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic API error");
            return Err(BackendError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: AnthropicResponse = response.json().await.map_err(|e| {
            BackendError::MalformedResponse(format!("Failed to parse Anthropic response: {e}"))
        })?;

        Ok(api_resp.text())
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponseContentBlock>,
}

impl AnthropicResponse {
    /// Concatenate the text blocks of the reply.
    fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            if let ResponseContentBlock::Text { text } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}
