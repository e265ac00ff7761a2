//! The "complete a conversation" capability and its error taxonomy.
//!
//! Failures are classified once, here, so callers match on
//! [`CompletionError`] instead of inspecting message text.

mod openai;


use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::api::ApiErrorDetails;
use crate::core::message::Turn;

pub use openai::{OpenAiGateway, DEFAULT_TIMEOUT};

/// Everything the gateway needs to produce the next assistant turn.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub turns: &'a [Turn],
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompletionError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("authentication failed: {message}")]
    Auth { message: String },

    #[error("the model `{model}` does not exist or you do not have access to it")]
    ModelNotFound { model: String },

    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("{}", transport_summary(.message, .timeout, .status))]
    Transport {
        message: String,
        timeout: bool,
        status: Option<u16>,
    },

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

fn transport_summary(message: &str, timeout: &bool, status: &Option<u16>) -> String {
    match (*timeout, *status) {
        (true, _) => format!("request timed out: {message}"),
        (false, Some(status)) => format!("server error ({status}): {message}"),
        (false, None) => format!("connection error: {message}"),
    }
}

impl CompletionError {
    pub fn missing_credential() -> Self {
        CompletionError::MissingCredential
    }

    /// Missing or rejected credential.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            CompletionError::MissingCredential | CompletionError::Auth { .. }
        )
    }

    /// Whether a caller may reasonably try the same request again later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. } | CompletionError::Transport { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CompletionError::Transport { timeout: true, .. })
    }
}

/// Maps a non-success HTTP response to its error class.
pub fn classify_failure(
    status: StatusCode,
    body: &str,
    model: &str,
    retry_after: Option<Duration>,
) -> CompletionError {
    let details = ApiErrorDetails::parse(body);
    let message = details
        .message
        .clone()
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("no details").to_string());

    if names_missing_model(&details) {
        return CompletionError::ModelNotFound {
            model: model.to_string(),
        };
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::Auth { message },
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited {
            message,
            retry_after,
        },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => CompletionError::Transport {
            message,
            timeout: true,
            status: Some(status.as_u16()),
        },
        status if status.is_server_error() => CompletionError::Transport {
            message,
            timeout: false,
            status: Some(status.as_u16()),
        },
        status => CompletionError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

fn names_missing_model(details: &ApiErrorDetails) -> bool {
    if details.code.as_deref() == Some("model_not_found") {
        return true;
    }
    details.message.as_deref().is_some_and(|message| {
        let lower = message.to_ascii_lowercase();
        lower.contains("model") && lower.contains("does not exist")
    })
}

/// Parses a `Retry-After` value given in whole seconds.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Produces the assistant's next turn for a conversation.
///
/// Implementations must not touch thread or configuration storage.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Turn, CompletionError>;
}
