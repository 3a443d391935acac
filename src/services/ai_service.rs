use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    /// The service answered with a non-success status.
    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No response at all (DNS, TLS, connection reset...).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Trait for chat completion backends (OpenRouter, test doubles, ...)
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the first choice's message content, untrimmed.
    async fn complete(&self, request: &ChatRequest) -> Result<String, CompletionError>;
}
