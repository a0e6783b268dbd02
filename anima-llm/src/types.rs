//! Request, response, and settings types for provider invocation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and persona framing.
    System,
    /// The end-user turn being appraised.
    User,
    /// A prior model turn, for multi-turn context.
    Assistant,
}

/// One turn of an OpenAI-style chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// A system-role message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user-role message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant-role message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat-completion request, before provider-specific envelope fields.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Ordered transcript, system prompt first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0 = deterministic).
    pub temperature: f32,
    /// Hard cap on generated tokens.
    pub max_tokens: u32,
    /// Optional stop sequences.
    pub stop: Option<Vec<String>>,
}

impl ChatRequest {
    /// Build a two-message request: system framing plus one user turn.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: 0.7,
            max_tokens: 512,
            stop: None,
        }
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the generated-token cap.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set stop sequences.
    #[must_use]
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Prompt plus completion.
    #[serde(default)]
    pub total_tokens: u32,
}

/// A successful chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The generated text.
    pub text: String,
    /// Model identifier echoed by the provider.
    pub model: String,
    /// Token accounting, zeroed when the provider omits it.
    pub usage: TokenUsage,
    /// Wall-clock latency of the winning attempt in milliseconds.
    pub latency_ms: u64,
}

/// Endpoint and retry tuning for a [`ProviderClient`](crate::ProviderClient).
#[derive(Debug, Clone)]
pub struct InvocationSettings {
    /// Base URL of the OpenAI-compatible API (no trailing slash).
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Per-attempt network timeout.
    pub attempt_timeout: Duration,
    /// Wall-clock budget for the whole invocation, retries included.
    pub overall_deadline: Duration,
    /// Transient-error retries on one credential before rotating.
    pub server_error_retries: u32,
    /// First backoff delay; doubles on each retry.
    pub backoff_initial: Duration,
}

impl Default for InvocationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.venice.ai/api/v1".to_string(),
            model: "llama-3.3-70b".to_string(),
            attempt_timeout: Duration::from_secs(30),
            overall_deadline: Duration::from_secs(120),
            server_error_retries: 3,
            backoff_initial: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_transcript_order() {
        let request = ChatRequest::new("You are an appraiser.", "Hola")
            .with_temperature(0.3)
            .with_max_tokens(256);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::User);
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, 256);
        assert!(request.stop.is_none());
    }

    #[test]
    fn messages_serialize_with_lowercase_roles() {
        let value = serde_json::to_value(ChatMessage::system("hi")).unwrap();
        assert_eq!(value["role"], "system");
        let value = serde_json::to_value(ChatMessage::assistant("ok")).unwrap();
        assert_eq!(value["role"], "assistant");
    }

    #[test]
    fn usage_tolerates_missing_fields() {
        let usage: TokenUsage = serde_json::from_str("{\"total_tokens\": 42}").unwrap();
        assert_eq!(usage.total_tokens, 42);
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.completion_tokens, 0);
    }

    #[test]
    fn default_settings_point_at_the_public_endpoint() {
        let settings = InvocationSettings::default();
        assert!(settings.base_url.starts_with("https://"));
        assert_eq!(settings.server_error_retries, 3);
        assert_eq!(settings.backoff_initial, Duration::from_secs(1));
    }
}
