//! Chat-completion provider abstraction and the default Groq-backed client.
//!
//! The pipeline never talks to an HTTP API directly; it goes through
//! [`ChatProvider`], which is injectable via
//! [`crate::config::SummaryConfig::builder`]. That keeps every LLM call
//! mockable in tests and leaves the door open for other backends.
//!
//! [`GroqClient`] is the production implementation: a single
//! `POST {base}/chat/completions` against an OpenAI-compatible endpoint
//! (Groq's by default), bearer-authenticated, JSON in and out.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Default OpenAI-compatible endpoint base (Groq).
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// One message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// A `system` role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// A `user` role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A chat-completion request: target model plus ordered messages.
///
/// Serializes to the OpenAI-compatible wire format directly, so the struct
/// doubles as the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// The slice of a completion response the pipeline consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatCompletion {
    /// Raw completion content. Trimming (or not) is the caller's decision.
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// An injectable chat-completions backend.
///
/// Implementations map their own transport and protocol failures into
/// [`ApiError`]; retry policy lives with the caller, not here.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one chat completion.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, ApiError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

// ── Wire types (response side) ────────────────────────────────────────────
// The request side is `ChatRequest` itself.

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// HTTP client for an OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl GroqClient {
    /// Client against the default Groq endpoint with a 60 s per-call timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_BASE)
    }

    /// Client against any OpenAI-compatible endpoint base
    /// (e.g. `https://api.groq.com/openai/v1`).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Override the per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, ApiError> {
        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: WireResponse = response.json().await.map_err(|e| ApiError::Network {
            reason: format!("invalid response body: {e}"),
        })?;

        let usage = parsed.usage.unwrap_or_default();
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ApiError::EmptyResponse)?;

        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "chat completion received"
        );

        Ok(ChatCompletion {
            content: choice.message.content.unwrap_or_default(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }

    fn name(&self) -> &str {
        "groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(ChatMessage::system("a").role, "system");
        assert_eq!(ChatMessage::user("b").role, "user");
        assert_eq!(ChatMessage::user("b").content, "b");
    }

    #[test]
    fn request_serializes_to_wire_format() {
        let request = ChatRequest {
            model: "llama-3.1-70b-versatile".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("usr")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.1-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
    }

    #[test]
    fn response_deserializes_content_and_usage() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "A summary."}}],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49}
        }"#;
        let parsed: WireResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("A summary."));
        assert_eq!(parsed.usage.unwrap().prompt_tokens, 42);
    }

    #[test]
    fn response_tolerates_missing_usage() {
        let body = r#"{"choices": [{"message": {"content": "x"}}]}"#;
        let parsed: WireResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let client = GroqClient::with_base_url("key", "https://example.test/v1/");
        assert_eq!(client.endpoint(), "https://example.test/v1/chat/completions");
    }

    #[test]
    fn debug_redacts_the_api_key() {
        let client = GroqClient::new("gsk_secret");
        let dump = format!("{client:?}");
        assert!(!dump.contains("gsk_secret"));
        assert!(dump.contains("<redacted>"));
    }
}
