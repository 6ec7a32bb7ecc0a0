use std::time::Duration;

use devkit_core::{AssistConfig, DevkitError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use devkit_assist::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("list files by size");
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
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use devkit_assist::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
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
/// Works with any provider exposing `/chat/completions` under its base URL:
/// Groq, OpenAI, Ollama and the like.
///
/// # Examples
///
/// ```
/// use devkit_core::AssistConfig;
/// use devkit_assist::llm::LlmClient;
///
/// let config = AssistConfig {
///     api_key: Some("test-key".into()),
///     ..AssistConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert!(client.has_api_key());
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: AssistConfig,
    api_key: Option<String>,
}

impl LlmClient {
    /// Create a client from configuration.
    ///
    /// The API key comes from the config, or else from the provider's
    /// environment variable (see [`AssistConfig::api_key_env`]).
    ///
    /// # Errors
    ///
    /// Returns [`DevkitError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &AssistConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DevkitError::Llm(format!("failed to create HTTP client: {e}")))?;
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var(config.api_key_env()).ok())
            .filter(|key| !key.is_empty());
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Whether a key was found in the config or the environment.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL of the chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.resolved_base_url())
    }

    /// Send a chat completion request and return the text response.
    ///
    /// Requests temperature 0.1 and a JSON object response format.
    ///
    /// # Errors
    ///
    /// Returns [`DevkitError::Llm`] on HTTP errors or response parsing failures.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let url = self.endpoint();
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": 0.1,
            "response_format": { "type": "json_object" },
        });
        debug!(%url, model = %self.config.model, "sending chat request");

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }
        request = request.header("Content-Type", "application/json");

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| DevkitError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(DevkitError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DevkitError::Llm(format!("failed to parse response: {e}")))?;

        extract_content(&response_body).map(str::to_string)
    }
}

/// Pull `choices[0].message.content` out of a completions response.
fn extract_content(body: &serde_json::Value) -> Result<&str> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| DevkitError::Llm(format!("unexpected response structure: {body}")))
}
