//! [`LlmDriver`] – OpenAI-compatible LLM interface.
//!
//! Talks to any server exposing an OpenAI-compatible
//! `/v1/chat/completions` endpoint: a local [Ollama](https://ollama.com)
//! instance (`http://localhost:11434`) or the hosted OpenAI API.
//!
//! # Example
//!
//! ```rust,no_run
//! use hearth_runtime::llm_driver::{Completion, LlmDriver, DEFAULT_SYSTEM_PROMPT};
//!
//! # async fn demo() -> Result<(), hearth_runtime::LlmError> {
//! let driver = LlmDriver::new("http://localhost:11434", "llama3").with_temperature(0.7);
//!
//! // Requires a running Ollama instance.
//! let reply = driver
//!     .complete(DEFAULT_SYSTEM_PROMPT, "You currently remember: ...")
//!     .await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Persona instruction sent as the system message of every turn.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a friendly household assistant that remembers simple facts from previous chats.";

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can arise from LLM driver operations.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The HTTP request to the model server failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The response from the model server could not be parsed.
    #[error("Unexpected response format: {0}")]
    BadResponse(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Completion seam
// ─────────────────────────────────────────────────────────────────────────────

/// The completion collaborator: one system instruction plus one prompt in,
/// one reply out.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Message types (OpenAI-compatible)
// ─────────────────────────────────────────────────────────────────────────────

/// The role of a participant in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal request / response shapes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Build the two-message conversation sent for every turn.
fn turn_messages(system: &str, prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: Role::System,
            content: system.to_string(),
        },
        ChatMessage {
            role: Role::User,
            content: prompt.to_string(),
        },
    ]
}

fn first_reply(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| LlmError::BadResponse("empty choices array".into()))
}

// ─────────────────────────────────────────────────────────────────────────────
// LlmDriver
// ─────────────────────────────────────────────────────────────────────────────

/// An async client for an OpenAI-compatible chat-completions endpoint.
///
/// Construct once per session and reuse across turns.
pub struct LlmDriver {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    client: reqwest::Client,
}

impl LlmDriver {
    /// Create a new driver pointing at `base_url` (e.g. `"http://localhost:11434"`)
    /// and using `model` (e.g. `"llama3"`).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            client: reqwest::Client::new(),
        }
    }

    /// Send `Authorization: Bearer <key>` with every request. Empty keys are
    /// ignored so a blank config field behaves like an absent one.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Completion for LlmDriver {
    /// Send the system instruction and `prompt` and return the assistant's
    /// reply with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the request fails, or
    /// [`LlmError::BadResponse`] if the response shape is unexpected.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let messages = turn_messages(system, prompt);
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            temperature: self.temperature,
            stream: false,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "sending chat completion");

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: ChatResponse = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        first_reply(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_role_variants_serialize() {
        let roles = [
            (Role::System, "system"),
            (Role::User, "user"),
            (Role::Assistant, "assistant"),
        ];
        for (role, expected) in roles {
            let msg = ChatMessage {
                role,
                content: String::new(),
            };
            let json = serde_json::to_string(&msg).unwrap();
            assert!(json.contains(expected));
        }
    }

    #[test]
    fn turn_messages_are_system_then_user() {
        let msgs = turn_messages(DEFAULT_SYSTEM_PROMPT, "User said: hi");
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(msgs[1].role, Role::User);
        assert_eq!(msgs[1].content, "User said: hi");
    }

    #[test]
    fn request_body_carries_temperature_and_no_stream() {
        let msgs = turn_messages("sys", "prompt");
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: &msgs,
            temperature: 0.7,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["stream"], false);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn first_reply_is_trimmed() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Hi there!\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_reply(response).unwrap(), "Hi there!");
    }

    #[test]
    fn empty_choices_is_bad_response() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_reply(response), Err(LlmError::BadResponse(_))));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let driver = LlmDriver::new("http://localhost:11434/", "llama3");
        assert_eq!(driver.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(driver.model(), "llama3");
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let driver = LlmDriver::new("https://api.openai.com", "gpt-4o-mini").with_api_key("");
        assert!(driver.api_key.is_none());
        let driver = driver.with_api_key("sk-test");
        assert_eq!(driver.api_key.as_deref(), Some("sk-test"));
    }
}
