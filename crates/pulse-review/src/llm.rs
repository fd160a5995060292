use std::time::Duration;

use pulse_core::{LlmConfig, PulseError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use pulse_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage::new(Role::User, "Review this issue");
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Build a message from a role and any string-like content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Role in the chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider exposing `{base_url}/chat/completions`:
/// OpenAI, Gemini's OpenAI endpoint, Ollama, vLLM, LiteLLM.
///
/// # Examples
///
/// ```
/// use pulse_core::LlmConfig;
/// use pulse_review::llm::LlmClient;
///
/// let client = LlmClient::new(&LlmConfig::default(), "sk-test").unwrap();
/// assert_eq!(client.model(), "gpt-4o-mini");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    /// Create a new LLM client from configuration and a resolved API key.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self, PulseError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| PulseError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url()),
            model: config.model().to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Model name sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one non-streaming chat completion request and return the
    /// first choice's text verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Llm`] on transport errors, non-success status
    /// codes, or a response without `choices[0].message.content`.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, PulseError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        debug!(endpoint = %self.endpoint, model = %self.model, "requesting chat completion");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PulseError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(PulseError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PulseError::Llm(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                PulseError::Llm(format!("unexpected response structure: {response_body}"))
            })?;

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_targets_provider_endpoint() {
        let config = LlmConfig {
            provider: "gemini".into(),
            ..LlmConfig::default()
        };
        let client = LlmClient::new(&config, "key").unwrap();
        assert_eq!(
            client.endpoint,
            "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
        );
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[test]
    fn custom_base_url_is_used() {
        let config = LlmConfig {
            base_url: Some("http://localhost:11434/v1/".into()),
            model: Some("llama3".into()),
            ..LlmConfig::default()
        };
        let client = LlmClient::new(&config, "key").unwrap();
        assert_eq!(client.endpoint, "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.model(), "llama3");
    }

    #[test]
    fn chat_message_serializes() {
        let msg = ChatMessage::new(Role::System, "hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hello");
    }
}
