//! Payloads of the OpenAI-compatible `chat/completions` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::message::Turn;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponseChoice {
    pub message: ChatResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatResponseChoice>,
}

impl ChatResponse {
    /// The first choice as an assistant turn, if the response has one.
    /// The reply is always recorded as the assistant's, whatever role the
    /// server echoes back.
    pub fn into_turn(self) -> Option<Turn> {
        let choice = self.choices.into_iter().next()?;
        Some(Turn::assistant(choice.message.content.unwrap_or_default()))
    }
}

/// Fields of an API error body that drive classification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorDetails {
    /// Pulls `error.code` and a one-line message out of an error body.
    /// Bodies that are not JSON keep their trimmed text as the message.
    pub fn parse(body: &str) -> Self {
        let trimmed = body.trim();
        let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
            return Self {
                code: None,
                message: (!trimmed.is_empty()).then(|| collapse_whitespace(trimmed)),
            };
        };

        let code = value
            .pointer("/error/code")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let message = value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| value.get("error").and_then(Value::as_str))
            .or_else(|| value.get("message").and_then(Value::as_str))
            .map(collapse_whitespace)
            .filter(|text| !text.is_empty());

        Self { code, message }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
